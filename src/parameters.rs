/// A positional value bound to a prepared statement.
#[derive(PartialEq, Debug, Clone)]
pub enum Parameter {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

macro_rules! impl_from_for_parameter {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Parameter {
            fn from(value: $t) -> Self {
                Parameter::$variant(value.into())
            }
        }
    };
}

impl_from_for_parameter!(i8, Int8);
impl_from_for_parameter!(i16, Int16);
impl_from_for_parameter!(i32, Int32);
impl_from_for_parameter!(i64, Int64);
impl_from_for_parameter!(u8, UInt8);
impl_from_for_parameter!(u16, UInt16);
impl_from_for_parameter!(u32, UInt32);
impl_from_for_parameter!(u64, UInt64);
impl_from_for_parameter!(bool, Bool);
impl_from_for_parameter!(f32, Float32);
impl_from_for_parameter!(f64, Float64);
impl_from_for_parameter!(String, String);
impl_from_for_parameter!(&str, String);

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameter::Null => write!(f, "NULL"),
            Parameter::Bool(value) => write!(f, "{}", value),
            Parameter::Int8(value) => write!(f, "{}", value),
            Parameter::Int16(value) => write!(f, "{}", value),
            Parameter::Int32(value) => write!(f, "{}", value),
            Parameter::Int64(value) => write!(f, "{}", value),
            Parameter::UInt8(value) => write!(f, "{}", value),
            Parameter::UInt16(value) => write!(f, "{}", value),
            Parameter::UInt32(value) => write!(f, "{}", value),
            Parameter::UInt64(value) => write!(f, "{}", value),
            Parameter::Float32(value) => write!(f, "{}", value),
            Parameter::Float64(value) => write!(f, "{}", value),
            Parameter::String(value) => write!(f, "'{}'", value),
        }
    }
}

/// The set of parameters bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    None,
    Positional(Vec<Parameter>),
}

impl Parameters {
    pub fn len(&self) -> usize {
        match self {
            Parameters::None => 0,
            Parameters::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        match self {
            Parameters::None => None,
            Parameters::Positional(values) => values.get(index),
        }
    }
}

/// The display form is the parameter description reported by slow-statement logging.
impl std::fmt::Display for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameters::None => Ok(()),
            Parameters::Positional(values) => {
                let values: Vec<String> = values.iter().map(|value| value.to_string()).collect();
                write!(f, "[{}]", values.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_parameter_from() {
        assert_eq!(Parameter::from(false), Parameter::Bool(false));
        assert_eq!(Parameter::from(true), Parameter::Bool(true));
        assert_eq!(Parameter::from("hello world"), Parameter::String("hello world".to_string()));
        assert_eq!(Parameter::from("hello world".to_string()), Parameter::String("hello world".to_string()));
        assert_eq!(Parameter::from(i8::MAX), Parameter::Int8(i8::MAX));
        assert_eq!(Parameter::from(i16::MAX), Parameter::Int16(i16::MAX));
        assert_eq!(Parameter::from(i32::MAX), Parameter::Int32(i32::MAX));
        assert_eq!(Parameter::from(i64::MAX), Parameter::Int64(i64::MAX));
        assert_eq!(Parameter::from(u8::MAX), Parameter::UInt8(u8::MAX));
        assert_eq!(Parameter::from(u16::MAX), Parameter::UInt16(u16::MAX));
        assert_eq!(Parameter::from(u32::MAX), Parameter::UInt32(u32::MAX));
        assert_eq!(Parameter::from(u64::MAX), Parameter::UInt64(u64::MAX));
        assert_eq!(Parameter::from(f32::MAX), Parameter::Float32(f32::MAX));
        assert_eq!(Parameter::from(f64::MAX), Parameter::Float64(f64::MAX));
    }

    #[test]
    fn test_parameters() {
        let parameters = params!(1i32, "Alice", true);
        assert_eq!(parameters.len(), 3);
        assert!(!parameters.is_empty());
        assert_eq!(parameters.get(0), Some(&Parameter::Int32(1)));
        assert_eq!(parameters.get(1), Some(&Parameter::String("Alice".to_string())));
        assert_eq!(parameters.get(2), Some(&Parameter::Bool(true)));
        assert_eq!(parameters.get(3), None);

        assert!(params!().is_empty());
        assert_eq!(params!().get(0), None);
    }

    #[test]
    fn test_parameters_display() {
        assert_eq!(params!(1i32, "Alice", true).to_string(), "[1, 'Alice', true]");
        assert_eq!(params!().to_string(), "");
    }
}
