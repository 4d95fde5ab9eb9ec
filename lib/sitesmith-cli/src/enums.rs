use std::collections::HashMap;

use thiserror::Error;

pub fn parse_enum<A: Copy>(
    values: &'static HashMap<&'static str, A>,
    src: &str,
) -> Result<A, EnumError> {
    match values.get(src.to_lowercase().as_str()) {
        Some(p) => Ok(*p),
        None => {
            let mut supported: Vec<&&str> = values.keys().collect();
            supported.sort();
            Err(EnumError {
                message: format!("Unsupported value: \"{src}\". Supported values: {supported:?}"),
            })
        }
    }
}

#[derive(Error, Debug)]
#[error("Enum error: {message}")]
pub struct EnumError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use lazy_static::lazy_static;

    use super::parse_enum;

    lazy_static! {
        static ref COLORS: HashMap<&'static str, u8> = HashMap::from([("red", 1), ("blue", 2)]);
    }

    #[test]
    fn known_value() {
        assert_eq!(2, parse_enum(&COLORS, "Blue").unwrap());
    }

    #[test]
    fn unknown_value_lists_supported() {
        let err = parse_enum(&COLORS, "green").unwrap_err();
        assert_eq!(
            "Enum error: Unsupported value: \"green\". Supported values: [\"blue\", \"red\"]",
            err.to_string()
        );
    }
}
