//! Output policy checks.

use crate::error::{Error, Result};
use crate::types::Statement;

/// Rejects output that still contains class declarations.
///
/// Every offending class is named in the error; unnamed ones are reported
/// as `anonymous class`.
pub fn validate_no_classes<'a>(statements: impl IntoIterator<Item = &'a Statement>) -> Result<()> {
    let names: Vec<String> = statements
        .into_iter()
        .filter(|statement| statement.is_class())
        .map(|statement| {
            statement
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| "anonymous class".to_string())
        })
        .collect();

    if names.is_empty() {
        return Ok(());
    }

    Err(Error::ClassesInOutput { names })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DeclarationSpec, ProgramBuilder};
    use crate::types::DeclarationKind;

    #[test]
    fn test_no_classes_passes() {
        let mut builder = ProgramBuilder::new();
        let unit = builder.unit("/project/src/index.ts");
        let foo = builder.symbol();
        builder.declare(unit, DeclarationSpec::interface("Foo", foo));
        let (program, _) = builder.build();

        assert!(validate_no_classes(&program.statements).is_ok());
    }

    #[test]
    fn test_classes_are_listed() {
        let mut builder = ProgramBuilder::new();
        let unit = builder.unit("/project/src/index.ts");
        let a = builder.symbol();
        let b = builder.symbol();
        builder.declare(unit, DeclarationSpec::class("Impl", a));
        builder.declare(unit, DeclarationSpec::anonymous(DeclarationKind::Class, b));
        let (program, _) = builder.build();

        let err = validate_no_classes(&program.statements).unwrap_err();
        assert!(matches!(&err, Error::ClassesInOutput { names } if names.len() == 2));
        assert_eq!(
            err.to_string(),
            "2 class statement(s) are found in generated dts: Impl, anonymous class"
        );
    }
}
