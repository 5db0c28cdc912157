//! Rendering of declarations as proto3 blocks
//!
//! Every function returns a block without trailing newline. Nested
//! declarations are indented by four spaces per level.

use swagger2proto_common::{escape, Enum, Field, Message, ProtoOption, Rpc, Service};

const INDENT: &str = "    ";

/// Verbs with their own field in `google.api.HttpRule`
const RULE_VERBS: [&str; 5] = ["get", "put", "post", "delete", "patch"];

pub fn render_message(message: &Message) -> String {
    let mut sections = Vec::new();

    if !message.fields.is_empty() {
        let fields: Vec<String> = message.fields.iter().map(render_field).collect();
        sections.push(fields.join("\n"));
    }
    sections.extend(message.messages.iter().map(render_message));
    sections.extend(message.enums.iter().map(render_enum));

    block(&format!("message {}", message.name), &sections.join("\n\n"))
}

pub fn render_field(field: &Field) -> String {
    let mut line = String::new();
    if field.repeated {
        line.push_str("repeated ");
    }
    line.push_str(&format!("{} {} = {}", field.field_type, field.name, field.number));
    if let Some(ref json_name) = field.json_name {
        line.push_str(&format!(" [json_name = \"{}\"]", escape(json_name)));
    }
    line.push(';');
    line
}

pub fn render_enum(e: &Enum) -> String {
    let values: Vec<String> = e
        .values
        .iter()
        .map(|v| format!("{} = {};", v.name, v.number))
        .collect();
    block(&format!("enum {}", e.name), &values.join("\n"))
}

pub fn render_service(service: &Service) -> String {
    let rpcs: Vec<String> = service.rpcs.iter().map(render_rpc).collect();
    block(&format!("service {}", service.name), &rpcs.join("\n"))
}

fn render_rpc(rpc: &Rpc) -> String {
    let head = format!(
        "rpc {}({}) returns ({})",
        rpc.name, rpc.request, rpc.response
    );

    let Some(ref http) = rpc.http else {
        return format!("{} {{}}", head);
    };

    let path = escape(&http.path);
    let pattern = if RULE_VERBS.contains(&http.method.as_str()) {
        format!("{}: \"{}\"", http.method, path)
    } else {
        block(
            "custom:",
            &format!("kind: \"{}\"\npath: \"{}\"", http.method.to_uppercase(), path),
        )
    };
    let mut rule = vec![pattern];
    if let Some(ref body) = http.body {
        rule.push(format!("body: \"{}\"", escape(body)));
    }
    let option = format!(
        "option (google.api.http) = {{\n{}\n}};",
        indent(&rule.join("\n"))
    );
    block(&head, &option)
}

/// `name = value` as it follows the `option` keyword
pub fn render_option(option: &ProtoOption) -> String {
    format!("{} = {}", option.name, option.value)
}

fn block(head: &str, body: &str) -> String {
    if body.is_empty() {
        return format!("{} {{}}", head);
    }
    format!("{} {{\n{}\n}}", head, indent(body))
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger2proto_common::{EnumValue, FieldType, HttpRule, OptionValue, ScalarType};

    fn field(name: &str, field_type: FieldType, number: u32) -> Field {
        Field {
            name: name.to_string(),
            field_type,
            number,
            repeated: false,
            json_name: None,
        }
    }

    #[test]
    fn test_render_field() {
        let mut tags = field("tags", FieldType::Scalar(ScalarType::String), 2);
        tags.repeated = true;
        assert_eq!(render_field(&tags), "repeated string tags = 2;");

        let mut owner = field("owner_name", FieldType::Named("Owner".to_string()), 3);
        owner.json_name = Some("ownerName".to_string());
        assert_eq!(
            render_field(&owner),
            "Owner owner_name = 3 [json_name = \"ownerName\"];"
        );

        let counts = field(
            "counts",
            FieldType::Map {
                key: ScalarType::String,
                value: Box::new(FieldType::Scalar(ScalarType::Int64)),
            },
            4,
        );
        assert_eq!(render_field(&counts), "map<string, int64> counts = 4;");
    }

    #[test]
    fn test_render_nested_message() {
        let mut inner = Message::new("Inner");
        inner
            .fields
            .push(field("id", FieldType::Scalar(ScalarType::Int64), 1));

        let mut outer = Message::new("Outer");
        outer
            .fields
            .push(field("inner", FieldType::Named("Inner".to_string()), 1));
        outer.messages.push(inner);
        outer.enums.push(Enum {
            name: "Kind".to_string(),
            values: vec![
                EnumValue {
                    name: "KIND_UNSPECIFIED".to_string(),
                    number: 0,
                },
                EnumValue {
                    name: "BIG".to_string(),
                    number: 1,
                },
            ],
        });

        let expected = "\
message Outer {
    Inner inner = 1;

    message Inner {
        int64 id = 1;
    }

    enum Kind {
        KIND_UNSPECIFIED = 0;
        BIG = 1;
    }
}";
        assert_eq!(render_message(&outer), expected);
    }

    #[test]
    fn test_render_empty_message() {
        assert_eq!(render_message(&Message::new("Nothing")), "message Nothing {}");
    }

    #[test]
    fn test_render_service_with_http_rule() {
        let service = Service {
            name: "PetsService".to_string(),
            rpcs: vec![
                Rpc {
                    name: "ListPets".to_string(),
                    request: "ListPetsRequest".to_string(),
                    response: "ListPetsResponse".to_string(),
                    http: None,
                },
                Rpc {
                    name: "PostPets".to_string(),
                    request: "PostPetsRequest".to_string(),
                    response: "Pet".to_string(),
                    http: Some(HttpRule {
                        method: "post".to_string(),
                        path: "/v1/pets".to_string(),
                        body: Some("pet".to_string()),
                    }),
                },
            ],
        };

        let expected = "\
service PetsService {
    rpc ListPets(ListPetsRequest) returns (ListPetsResponse) {}
    rpc PostPets(PostPetsRequest) returns (Pet) {
        option (google.api.http) = {
            post: \"/v1/pets\"
            body: \"pet\"
        };
    }
}";
        assert_eq!(render_service(&service), expected);
    }

    #[test]
    fn test_render_custom_verb() {
        let rpc = Rpc {
            name: "HeadPing".to_string(),
            request: "HeadPingRequest".to_string(),
            response: "google.protobuf.Empty".to_string(),
            http: Some(HttpRule {
                method: "head".to_string(),
                path: "/ping".to_string(),
                body: None,
            }),
        };

        let expected = "\
rpc HeadPing(HeadPingRequest) returns (google.protobuf.Empty) {
    option (google.api.http) = {
        custom: {
            kind: \"HEAD\"
            path: \"/ping\"
        }
    };
}";
        assert_eq!(render_rpc(&rpc), expected);
    }

    #[test]
    fn test_render_option() {
        let option = ProtoOption {
            name: "go_package".to_string(),
            value: OptionValue::String("example.com/pets".to_string()),
        };
        assert_eq!(render_option(&option), "go_package = \"example.com/pets\"");
    }
}
