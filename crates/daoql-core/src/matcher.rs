//! Match-by-example constraint extraction.
//!
//! Walks the declared matchable properties of an example object and emits
//! one equality constraint per non-null scalar, recursing into nested
//! matchable sub-objects with a dotted path prefix. A match that would
//! produce zero effective constraints is rejected: it would silently
//! return the unfiltered set.

use crate::entity::{Matchable, MatchValue};
use crate::error::QueryError;
use crate::statement::StatementText;
use tracing::trace;

/// Emits equality constraints for an example object into a statement
/// buffer.
#[derive(Debug, Default)]
pub struct MatchExtractor {
    fields_seen: usize,
    constraints: usize,
}

impl MatchExtractor {
    /// A fresh extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract constraints from `example` into `text`, returning how many
    /// constraints were emitted.
    ///
    /// Fails with [`QueryError::NoMatchableFields`] when the example
    /// declares no matchable properties at all, and with
    /// [`QueryError::AllMatchableFieldsNull`] when every declared
    /// property was null. Any unsupported value type is fatal.
    pub fn extract(
        mut self,
        example: &dyn Matchable,
        text: &mut StatementText,
    ) -> Result<usize, QueryError> {
        self.walk(None, example, text)?;
        if self.fields_seen == 0 {
            return Err(QueryError::NoMatchableFields(example.type_name()));
        }
        if self.constraints == 0 {
            return Err(QueryError::AllMatchableFieldsNull(example.type_name()));
        }
        Ok(self.constraints)
    }

    fn walk(
        &mut self,
        prefix: Option<&str>,
        object: &dyn Matchable,
        text: &mut StatementText,
    ) -> Result<(), QueryError> {
        for (name, value) in object.match_fields() {
            self.fields_seen += 1;
            let path = match prefix {
                Some(p) => format!("{p}.{name}"),
                None => name.to_owned(),
            };
            match value {
                MatchValue::Null => {
                    trace!(field = %path, "skipping null matchable field");
                }
                MatchValue::Scalar(scalar) => {
                    trace!(field = %path, "adding match constraint");
                    text.and_add(&format!("target.{path} = {}", scalar.to_literal()));
                    self.constraints += 1;
                }
                MatchValue::Nested(inner) => {
                    self.walk(Some(&path), inner, text)?;
                }
                MatchValue::Unsupported(type_name) => {
                    return Err(QueryError::UnsupportedMatchType {
                        field: path,
                        type_name,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ScalarValue;

    struct Address {
        city: Option<String>,
    }

    impl Matchable for Address {
        fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
            vec![("city", MatchValue::from_option(&self.city))]
        }

        fn type_name(&self) -> &'static str {
            "Address"
        }
    }

    struct Person {
        name: Option<String>,
        age: Option<i64>,
        address: Option<Address>,
    }

    impl Matchable for Person {
        fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
            vec![
                ("name", MatchValue::from_option(&self.name)),
                ("age", MatchValue::from_option(&self.age)),
                ("address", MatchValue::from_nested(&self.address)),
            ]
        }

        fn type_name(&self) -> &'static str {
            "Person"
        }
    }

    struct Opaque;

    impl Matchable for Opaque {
        fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
            vec![("payload", MatchValue::Unsupported("Blob"))]
        }

        fn type_name(&self) -> &'static str {
            "Opaque"
        }
    }

    struct Bare;

    impl Matchable for Bare {
        fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
            Vec::new()
        }

        fn type_name(&self) -> &'static str {
            "Bare"
        }
    }

    fn extract(example: &dyn Matchable) -> Result<String, QueryError> {
        let mut text = StatementText::new();
        MatchExtractor::new().extract(example, &mut text)?;
        Ok(text.into_string())
    }

    #[test]
    fn test_single_scalar_constraint() {
        let person = Person {
            name: Some("Ada".into()),
            age: None,
            address: None,
        };
        assert_eq!(extract(&person).unwrap(), "target.name = 'Ada'");
    }

    #[test]
    fn test_null_fields_skipped() {
        let person = Person {
            name: Some("Ada".into()),
            age: Some(36),
            address: None,
        };
        assert_eq!(
            extract(&person).unwrap(),
            "target.name = 'Ada' and target.age = 36"
        );
    }

    #[test]
    fn test_quote_doubling() {
        let person = Person {
            name: Some("O'Brien".into()),
            age: None,
            address: None,
        };
        assert_eq!(extract(&person).unwrap(), "target.name = 'O''Brien'");
    }

    #[test]
    fn test_nested_dotted_path() {
        let person = Person {
            name: None,
            age: None,
            address: Some(Address {
                city: Some("Dublin".into()),
            }),
        };
        assert_eq!(extract(&person).unwrap(), "target.address.city = 'Dublin'");
    }

    #[test]
    fn test_no_matchable_fields() {
        assert!(matches!(
            extract(&Bare),
            Err(QueryError::NoMatchableFields("Bare"))
        ));
    }

    #[test]
    fn test_all_matchable_fields_null() {
        let person = Person {
            name: None,
            age: None,
            address: None,
        };
        assert!(matches!(
            extract(&person),
            Err(QueryError::AllMatchableFieldsNull("Person"))
        ));
    }

    #[test]
    fn test_all_null_through_nested() {
        // A nested object whose own fields are all null still counts as
        // "seen but unconstrained".
        let person = Person {
            name: None,
            age: None,
            address: Some(Address { city: None }),
        };
        assert!(matches!(
            extract(&person),
            Err(QueryError::AllMatchableFieldsNull("Person"))
        ));
    }

    #[test]
    fn test_unsupported_type_is_fatal() {
        match extract(&Opaque) {
            Err(QueryError::UnsupportedMatchType { field, type_name }) => {
                assert_eq!(field, "payload");
                assert_eq!(type_name, "Blob");
            }
            other => panic!("expected UnsupportedMatchType, got {other:?}"),
        }
    }

    #[test]
    fn test_char_constraint() {
        struct Flag {
            code: Option<char>,
        }
        impl Matchable for Flag {
            fn match_fields(&self) -> Vec<(&'static str, MatchValue<'_>)> {
                vec![(
                    "code",
                    match self.code {
                        Some(c) => MatchValue::Scalar(ScalarValue::Char(c)),
                        None => MatchValue::Null,
                    },
                )]
            }
            fn type_name(&self) -> &'static str {
                "Flag"
            }
        }
        let flag = Flag { code: Some('x') };
        assert_eq!(extract(&flag).unwrap(), "target.code = 'x'");
    }
}
