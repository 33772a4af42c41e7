use crate::codec::jsv::{self, JsvDecode, JsvEncode, JsvNode};
use crate::codec::CodecError;
use crate::equality::{compare, StructuralEq};

/// Nested record carried inside `AllTypes`, serialized as `{Id:0,Name:Name0}`
#[derive(Debug, Clone, Default)]
pub struct SubType {
    pub id: i32,
    pub name: String,
}

impl SubType {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl StructuralEq for SubType {
    fn first_mismatch(&self, other: &Self) -> Option<crate::equality::FieldMismatch> {
        compare("Id", &self.id, &other.id).or_else(|| compare("Name", &self.name, &other.name))
    }
}

impl PartialEq for SubType {
    fn eq(&self, other: &Self) -> bool {
        self.structural_equals(other)
    }
}

impl JsvEncode for SubType {
    fn write_jsv(&self, out: &mut String) {
        let fields: [(&str, &dyn JsvEncode); 2] = [("Id", &self.id), ("Name", &self.name)];
        jsv::write_record(out, &fields);
    }
}

impl JsvDecode for SubType {
    fn from_jsv(node: &JsvNode) -> Result<Self, CodecError> {
        Ok(Self {
            id: i32::from_jsv(node.field("Id")?)?,
            name: String::from_jsv(node.field("Name")?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_type_jsv_form() {
        let text = jsv::to_string(&SubType::new(0, "Name0"));
        assert_eq!(text, "{Id:0,Name:Name0}");
        let back: SubType = jsv::from_str(&text).unwrap();
        assert_eq!(back, SubType::new(0, "Name0"));
    }

    #[test]
    fn test_sub_type_mismatch_path() {
        let m = SubType::new(1, "a")
            .first_mismatch(&SubType::new(1, "b"))
            .unwrap();
        assert_eq!(m.field, "Name");
    }

    #[test]
    fn test_missing_field_is_reported() {
        let err = jsv::from_str::<SubType>("{Id:1}").unwrap_err();
        assert_eq!(err, CodecError::MissingField("Name"));
    }
}
