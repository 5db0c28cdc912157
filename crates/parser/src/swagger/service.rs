//! Paths and operations to RPCs

use super::converter::TranslationContext;
use super::types::{Operation, Parameter, PathItem, Schema, SchemaKind};
use crate::naming::path_method_to_name;
use std::collections::HashSet;
use swagger2proto_common::{
    GeneratorError, HttpRule, Message, ProtoFile, Result, Rpc, Service, EMPTY_PROTO,
};
use tracing::debug;

const EMPTY: &str = "google.protobuf.Empty";

/// Parameter locations that become request fields
const REQUEST_LOCATIONS: [&str; 4] = ["path", "query", "formData", "body"];

impl<'a> TranslationContext<'a> {
    /// Build the service for every path, in lexicographic path order
    ///
    /// Request and response messages are appended to `file`.
    pub fn translate_paths(&mut self, service_name: &str, file: &mut ProtoFile) -> Result<Service> {
        let api = self.api;
        let mut service = Service {
            name: service_name.to_string(),
            rpcs: Vec::new(),
        };
        let mut rpc_names = HashSet::new();

        let mut paths: Vec<(&String, &PathItem)> = api.paths.iter().collect();
        paths.sort_by(|a, b| a.0.cmp(b.0));

        for (path, item) in paths {
            for (verb, operation) in item.operations() {
                let name = path_method_to_name(
                    path,
                    verb,
                    operation.operation_id.as_deref().unwrap_or(""),
                );
                if !rpc_names.insert(name.clone()) {
                    return Err(GeneratorError::collision(
                        format!("service {}", service_name),
                        name,
                    ));
                }

                let rpc = self.translate_operation(&name, path, verb, item, operation, file)?;
                debug!(rpc = %rpc.name, path = %path, verb, "translated operation");
                service.rpcs.push(rpc);
            }
        }

        Ok(service)
    }

    fn translate_operation(
        &mut self,
        name: &str,
        path: &str,
        verb: &str,
        item: &'a PathItem,
        operation: &'a Operation,
        file: &mut ProtoFile,
    ) -> Result<Rpc> {
        let parameters = self.operation_parameters(name, item, operation)?;

        let mark = self.reference_mark();
        let request_name = format!("{}Request", name);
        let mut request = Message::new(&request_name);
        let mut field_names = HashSet::new();
        let mut body = None;

        for (index, parameter) in parameters.iter().enumerate() {
            let field = self.field(
                &mut request,
                &parameter.name,
                &parameter.value_schema(),
                index as u32 + 1,
            )?;
            if !field_names.insert(field.name.clone()) {
                return Err(GeneratorError::collision(
                    format!("message {}", request_name),
                    field.name,
                ));
            }
            if parameter.location == "body" {
                body = Some(field.name.clone());
            }
            request.fields.push(field);
        }
        self.check_shadowing(&request, mark)?;
        add_message(file, request)?;

        let response = match self.response_schema(name, operation)? {
            Some(schema) => match schema.kind() {
                SchemaKind::Reference(reference) if !self.is_local_enum(reference) => {
                    self.resolve(reference, &format!("{} response", name))?
                        .qualified_name
                }
                // enums and everything inline are wrapped in a response message
                _ => {
                    let response_name = format!("{}Response", name);
                    let message = self.standalone_message(&response_name, schema)?;
                    add_message(file, message)?;
                    response_name
                }
            },
            None => {
                self.imports.insert(EMPTY_PROTO.to_string());
                EMPTY.to_string()
            }
        };

        let http = self.options.custom_options.then(|| HttpRule {
            method: verb.to_string(),
            path: self.http_path(path),
            body,
        });

        Ok(Rpc {
            name: name.to_string(),
            request: request_name,
            response,
            http,
        })
    }

    /// Path and operation parameters, `$ref`s followed
    ///
    /// Operation parameters replace path parameters with the same name and
    /// location. Header parameters are left out.
    fn operation_parameters(
        &self,
        rpc: &str,
        item: &PathItem,
        operation: &Operation,
    ) -> Result<Vec<Parameter>> {
        let mut parameters: Vec<Parameter> = Vec::new();

        for parameter in item.parameters.iter().chain(&operation.parameters) {
            let parameter = self.parameter(rpc, parameter)?;
            if !REQUEST_LOCATIONS.contains(&parameter.location.as_str()) {
                continue;
            }
            match parameters
                .iter_mut()
                .find(|p| p.name == parameter.name && p.location == parameter.location)
            {
                Some(existing) => *existing = parameter,
                None => parameters.push(parameter),
            }
        }

        Ok(parameters)
    }

    fn parameter(&self, rpc: &str, parameter: &Parameter) -> Result<Parameter> {
        let Some(ref reference) = parameter.ref_path else {
            return Ok(parameter.clone());
        };

        reference
            .strip_prefix("#/parameters/")
            .and_then(|name| self.api.parameters.get(name))
            .cloned()
            .ok_or_else(|| GeneratorError::unresolved(reference.as_str(), format!("{} parameters", rpc)))
    }

    /// Schema of the success response
    ///
    /// Looks at `200`, `201`, the remaining `2xx` codes in order, then
    /// `default`, and takes the first that has a schema.
    fn response_schema(&self, rpc: &str, operation: &'a Operation) -> Result<Option<&'a Schema>> {
        let api = self.api;
        let mut codes: Vec<&str> = vec!["200", "201"];
        let mut others: Vec<&str> = operation
            .responses
            .keys()
            .map(String::as_str)
            .filter(|code| code.starts_with('2') && *code != "200" && *code != "201")
            .collect();
        others.sort_unstable();
        codes.extend(others);
        codes.push("default");

        for code in codes {
            let Some(response) = operation.responses.get(code) else {
                continue;
            };
            let response = match response.ref_path {
                Some(ref reference) => reference
                    .strip_prefix("#/responses/")
                    .and_then(|name| api.responses.get(name))
                    .ok_or_else(|| {
                        GeneratorError::unresolved(reference.as_str(), format!("{} responses", rpc))
                    })?,
                None => response,
            };
            if let Some(ref schema) = response.schema {
                return Ok(Some(schema));
            }
        }

        Ok(None)
    }

    /// Whether `reference` names a local definition that becomes an enum
    fn is_local_enum(&self, reference: &str) -> bool {
        self.local_definition(reference)
            .is_some_and(|schema| matches!(schema.kind(), SchemaKind::Enum(_)))
    }

    fn http_path(&self, path: &str) -> String {
        let base = self.api.base_path.as_deref().unwrap_or("").trim_end_matches('/');
        format!("{}{}", base, path)
    }
}

fn add_message(file: &mut ProtoFile, message: Message) -> Result<()> {
    if file.has_declaration(&message.name) {
        return Err(GeneratorError::collision(
            format!("package {:?}", file.package),
            message.name,
        ));
    }
    file.messages.push(message);
    Ok(())
}
