//! Definition checks run before synthesis.

use std::collections::BTreeSet;

use dlq_lang::ast::{Definition, Program};

use crate::error::{SynthError, SynthResult};

/// Detect multiple definitions, uses of undefined identifiers, and an
/// undefined amplify target. Scoping is strictly forward: an expression
/// may only reference registers defined on earlier lines.
pub fn check_program(program: &Program) -> SynthResult<()> {
    let mut defined: BTreeSet<&str> = BTreeSet::new();

    for def in &program.definitions {
        if defined.contains(def.name()) {
            return Err(SynthError::AlreadyDefined {
                line: def.line(),
                name: def.name().to_string(),
            });
        }
        if let Definition::Expression(d) = def {
            for leaf in d.expr.identifiers() {
                if !defined.contains(leaf.as_str()) {
                    return Err(SynthError::Undefined { line: d.line, name: leaf });
                }
            }
        }
        defined.insert(def.name());
    }

    if !defined.contains(program.terminator.target.as_str()) {
        return Err(SynthError::AmplifyTargetUndefined {
            line: program.terminator.line,
            name: program.terminator.target.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlq_lang::parse;

    #[test]
    fn test_valid_program_passes() {
        let program = parse("a[3] in {1, 2};\nb[4] := a + 1;\namplify b 0 times").unwrap();
        assert!(check_program(&program).is_ok());
    }

    #[test]
    fn test_redefinition_detected() {
        let program = parse("a[3] in {1};\na[2] in {0};\namplify a 0 times").unwrap();
        match check_program(&program) {
            Err(SynthError::AlreadyDefined { line, name }) => {
                assert_eq!(line, 2);
                assert_eq!(name, "a");
            }
            other => panic!("expected redefinition error, got {other:?}"),
        }
    }

    #[test]
    fn test_undefined_identifier_detected() {
        let program = parse("b[4] := a + 1;\namplify b 0 times").unwrap();
        match check_program(&program) {
            Err(SynthError::Undefined { line, name }) => {
                assert_eq!(line, 1);
                assert_eq!(name, "a");
            }
            other => panic!("expected undefined identifier error, got {other:?}"),
        }
    }

    #[test]
    fn test_backward_reference_rejected() {
        let program = parse("b[4] := a + 1;\na[3] in {1};\namplify b 0 times").unwrap();
        assert!(matches!(
            check_program(&program),
            Err(SynthError::Undefined { line: 1, .. })
        ));
    }

    #[test]
    fn test_undefined_amplify_target_detected() {
        let program = parse("a[3] in {1};\namplify r 2 times").unwrap();
        match check_program(&program) {
            Err(SynthError::AmplifyTargetUndefined { line, name }) => {
                assert_eq!(line, 2);
                assert_eq!(name, "r");
            }
            other => panic!("expected amplify target error, got {other:?}"),
        }
    }
}
