//! Line-oriented statement parser
//!
//! Source text is never compiled. Each line is classified against a fixed
//! priority list of statement kinds; the first kind whose trigger shows up on
//! the line owns it. A line no kind claims, or one whose owner can't make
//! sense of it, is dropped without complaint.

use std::collections::BTreeMap;

use super::action::Action;
use super::state::{ArtifactColor, Value};

/// Interpreter-local variable table
pub type Variables = BTreeMap<String, Value>;

/// Variable the color-sensor pseudo-calls read
pub const ARTIFACT_COLOR_VAR: &str = "current_artifact_color";

/// Lines starting with any of these carry no action
const SKIP_PREFIXES: [&str; 8] = [
    "//",
    "/*",
    "*",
    "package",
    "import",
    "public class",
    "@Override",
    "public void",
];

/// Declarable variable types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclType {
    Int,
    Double,
    String,
    Boolean,
}

impl DeclType {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" => Some(DeclType::Int),
            "double" => Some(DeclType::Double),
            "String" => Some(DeclType::String),
            "boolean" => Some(DeclType::Boolean),
            _ => None,
        }
    }
}

/// A classified line with its arguments still unresolved
#[derive(Debug, Clone, PartialEq)]
enum Statement<'a> {
    Declare {
        ty: DeclType,
        name: &'a str,
        raw: &'a str,
    },
    Telemetry {
        key: &'a str,
        raw: &'a str,
    },
    Drive(&'a str),
    Spindexer(&'a str),
    Intake(&'a str),
    Shoot,
    Sleep(&'a str),
}

/// Statement kinds, tried in declaration order
#[derive(Debug, Clone, Copy)]
enum Kind {
    Declare,
    Telemetry,
    Drive,
    Spindexer,
    Intake,
    Shoot,
    Sleep,
}

const PRIORITY: [Kind; 7] = [
    Kind::Declare,
    Kind::Telemetry,
    Kind::Drive,
    Kind::Spindexer,
    Kind::Intake,
    Kind::Shoot,
    Kind::Sleep,
];

/// Outcome of offering a line to one statement kind
enum Claim<'a> {
    /// Not this kind; try the next one
    Pass,
    /// This kind owns the line. `None` means the line is malformed and
    /// gets dropped.
    Owned(Option<Statement<'a>>),
}

impl Kind {
    fn claim(self, line: &str) -> Claim<'_> {
        match self {
            Kind::Declare => match declaration(line) {
                Some(stmt) => Claim::Owned(Some(stmt)),
                None => Claim::Pass,
            },
            Kind::Telemetry => owned_if(line, "telemetry.addData", |line| {
                let args = call_argument(line, "telemetry.addData")?;
                let (key, raw) = args.split_once(',')?;
                if key.is_empty() || raw.is_empty() {
                    return None;
                }
                Some(Statement::Telemetry { key, raw })
            }),
            Kind::Drive => owned_if(line, "motor.setPower", |line| {
                call_argument(line, "motor.setPower").map(Statement::Drive)
            }),
            Kind::Spindexer => owned_if(line, "spindexer.setPosition", |line| {
                call_argument(line, "spindexer.setPosition").map(Statement::Spindexer)
            }),
            Kind::Intake => owned_if(line, "intakeMotor.setPower", |line| {
                call_argument(line, "intakeMotor.setPower").map(Statement::Intake)
            }),
            Kind::Shoot => owned_if(line, "shoot()", |_| Some(Statement::Shoot)),
            Kind::Sleep => owned_if(line, "sleep", |line| {
                call_argument(line, "sleep").map(Statement::Sleep)
            }),
        }
    }
}

fn owned_if<'a>(
    line: &'a str,
    trigger: &str,
    shape: impl FnOnce(&'a str) -> Option<Statement<'a>>,
) -> Claim<'a> {
    if line.contains(trigger) {
        Claim::Owned(shape(line))
    } else {
        Claim::Pass
    }
}

fn classify(line: &str) -> Option<Statement<'_>> {
    for kind in PRIORITY {
        if let Claim::Owned(stmt) = kind.claim(line) {
            return stmt;
        }
    }
    None
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `<type> <name> = <expr>`, anchored at the start of the line
fn declaration(line: &str) -> Option<Statement<'_>> {
    let ty_end = line.find(char::is_whitespace)?;
    let ty = DeclType::from_keyword(&line[..ty_end])?;

    let rest = line[ty_end..].trim_start();
    let name_len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];

    let rest = rest[name_len..].trim_start().strip_prefix('=')?;
    if rest.is_empty() {
        return None;
    }
    Some(Statement::Declare {
        ty,
        name,
        raw: rest.trim(),
    })
}

/// Text between the `(` that follows `callee` and the last `)` on the line.
fn call_argument<'a>(line: &'a str, callee: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(offset) = line[from..].find(callee) {
        let start = from + offset;
        let after = line[start + callee.len()..].trim_start();
        if let Some(inner) = after.strip_prefix('(')
            && let Some(close) = inner.rfind(')')
            && close > 0
        {
            return Some(&inner[..close]);
        }
        // callees are ASCII, so one byte past a match is a char boundary
        from = start + 1;
    }
    None
}

/// Drops one leading and one trailing double quote, independently
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

/// Reads the longest leading float literal, the way learners expect
/// `0.5abc` or `  3e2` to read.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    if s[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start {
            digits += j - frac_start;
            end = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().ok()
}

/// Reads the longest leading base-10 integer literal
pub fn parse_int_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// Variable value or numeric literal; anything unreadable is 0
fn resolve_number(raw: &str, vars: &Variables) -> f64 {
    let n = match vars.get(raw) {
        Some(value) => value.as_number(),
        None => parse_float_prefix(raw).unwrap_or(f64::NAN),
    };
    if n.is_nan() { 0.0 } else { n }
}

/// Whole milliseconds from a variable or integer literal; anything
/// unreadable, negative or unbounded is 0
fn resolve_millis(raw: &str, vars: &Variables) -> u64 {
    let n = match vars.get(raw) {
        Some(value) => value.as_number(),
        None => parse_int_prefix(raw).unwrap_or(f64::NAN),
    };
    if n.is_finite() && n > 0.0 {
        n.trunc() as u64
    } else {
        0
    }
}

fn declared_value(ty: DeclType, raw: &str, vars: &Variables) -> Value {
    // One level of indirection, no expression evaluation
    let resolved = vars
        .get(raw)
        .cloned()
        .unwrap_or_else(|| Value::Text(raw.to_string()));

    match ty {
        DeclType::Int | DeclType::Double => {
            let n = resolved.as_number();
            Value::Number(if n.is_nan() { 0.0 } else { n })
        }
        DeclType::String => Value::Text(strip_quotes(&resolved.to_string()).to_string()),
        DeclType::Boolean => Value::Bool(match resolved {
            Value::Bool(b) => b,
            other => other.to_string() == "true",
        }),
    }
}

fn artifact_color_is(vars: &Variables, color: ArtifactColor) -> bool {
    matches!(vars.get(ARTIFACT_COLOR_VAR), Some(Value::Text(c)) if c == color.as_str())
}

fn telemetry_value(raw: &str, vars: &Variables) -> Value {
    match raw {
        "colorSensor.isPurple()" => Value::Bool(artifact_color_is(vars, ArtifactColor::Purple)),
        "colorSensor.isGreen()" => Value::Bool(artifact_color_is(vars, ArtifactColor::Green)),
        _ => match vars.get(raw) {
            Some(value) => value.clone(),
            None if raw.starts_with('"') => Value::Text(strip_quotes(raw).to_string()),
            None => Value::Text(raw.to_string()),
        },
    }
}

/// Trimmed statement text, or `None` for lines that never carry an action
fn statement_text(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line == "}" || SKIP_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return None;
    }
    Some(line.strip_suffix(';').unwrap_or(line))
}

/// Incremental parser; the variable table persists across lines
#[derive(Debug, Default)]
pub struct Parser {
    variables: Variables,
    actions: Vec<Action>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one source line, appending at most one action
    pub fn feed_line(&mut self, line: &str) {
        let Some(text) = statement_text(line) else {
            return;
        };
        match classify(text) {
            Some(stmt) => {
                let action = self.lower(stmt);
                self.actions.push(action);
            }
            None => log::trace!("ignoring line: {text}"),
        }
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn finish(self) -> Vec<Action> {
        self.actions
    }

    fn lower(&mut self, stmt: Statement<'_>) -> Action {
        let vars = &self.variables;
        match stmt {
            Statement::Declare { ty, name, raw } => {
                let value = declared_value(ty, raw, vars);
                self.variables.insert(name.to_string(), value.clone());
                Action::Var {
                    name: name.to_string(),
                    value,
                }
            }
            Statement::Telemetry { key, raw } => Action::Log {
                key: strip_quotes(key.trim()).to_string(),
                value: telemetry_value(raw.trim(), vars).to_string(),
            },
            Statement::Drive(raw) => Action::Move {
                power: resolve_number(raw.trim(), vars).clamp(-1.0, 1.0),
            },
            Statement::Spindexer(raw) => Action::Spindexer {
                pos: resolve_number(raw.trim(), vars).clamp(0.0, 1.0),
            },
            Statement::Intake(raw) => Action::Intake {
                power: resolve_number(raw.trim(), vars).clamp(-1.0, 1.0),
            },
            Statement::Shoot => Action::Shoot,
            Statement::Sleep(raw) => Action::Sleep {
                duration_ms: resolve_millis(raw.trim(), vars),
            },
        }
    }
}

/// Parse a whole source text into actions
pub fn parse(source: &str) -> Vec<Action> {
    let mut parser = Parser::new();
    for line in source.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_and_unrecognized_source() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n").is_empty());
        assert!(parse("telemetry.update();\nwaitForStart();\nif (x) {\n} else {\n}").is_empty());
    }

    #[test]
    fn test_boilerplate_and_comments_skipped() {
        let src = "package org.firstinspires;\n\
                   import com.qualcomm.robotcore.*;\n\
                   public class Auto extends LinearOpMode {\n\
                   @Override\n\
                   public void runOpMode() {\n\
                   // motor.setPower(1.0);\n\
                   /* shoot(); */\n\
                   * sleep(100);\n\
                   motor.setPower(0.3);\n\
                   }\n\
                   }";
        assert_eq!(parse(src), vec![Action::Move { power: 0.3 }]);
    }

    #[test]
    fn test_declaration_types() {
        let actions = parse(
            "int ticks = 500;\n\
             double power = 0.5;\n\
             String name = \"DECODE\";\n\
             boolean running = true;\n\
             boolean stopped = nope;",
        );
        assert_eq!(
            actions,
            vec![
                Action::Var {
                    name: "ticks".into(),
                    value: Value::Number(500.0)
                },
                Action::Var {
                    name: "power".into(),
                    value: Value::Number(0.5)
                },
                Action::Var {
                    name: "name".into(),
                    value: Value::Text("DECODE".into())
                },
                Action::Var {
                    name: "running".into(),
                    value: Value::Bool(true)
                },
                Action::Var {
                    name: "stopped".into(),
                    value: Value::Bool(false)
                },
            ]
        );
    }

    #[test]
    fn test_declaration_needs_known_type() {
        assert!(parse("float x = 1.0;").is_empty());
        assert!(parse("integer x = 1;").is_empty());
        assert!(parse("int = 4;").is_empty());
    }

    #[test]
    fn test_declaration_indirection_is_one_level() {
        let actions = parse("double a = 0.25;\ndouble b = a;\ndouble c = a + b;");
        assert_eq!(
            actions[1],
            Action::Var {
                name: "b".into(),
                value: Value::Number(0.25)
            }
        );
        // No arithmetic: "a + b" is not a variable and reads as no number
        assert_eq!(
            actions[2],
            Action::Var {
                name: "c".into(),
                value: Value::Number(0.0)
            }
        );
    }

    #[test]
    fn test_declaration_through_boolean_variable() {
        let actions = parse("boolean a = true;\nboolean b = a;\nint n = a;\nString s = a;");
        // A boolean source keeps its value, and reads as 1 when numeric
        assert_eq!(
            &actions[1..],
            &[
                Action::Var {
                    name: "b".into(),
                    value: Value::Bool(true)
                },
                Action::Var {
                    name: "n".into(),
                    value: Value::Number(1.0)
                },
                Action::Var {
                    name: "s".into(),
                    value: Value::Text("true".into())
                },
            ]
        );
    }

    #[test]
    fn test_variable_power_resolves() {
        let actions = parse("double motorPower = 0.5;\nmotor.setPower(motorPower);");
        assert_eq!(actions[1], Action::Move { power: 0.5 });
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let mut parser = Parser::new();
        parser.feed_line("double p = 0.2;");
        parser.feed_line("double p = 0.9;");
        parser.feed_line("motor.setPower(p);");
        assert_eq!(parser.variables().get("p"), Some(&Value::Number(0.9)));
        assert_eq!(parser.finish()[2], Action::Move { power: 0.9 });
    }

    #[test]
    fn test_telemetry_forms() {
        let actions = parse(
            "telemetry.addData(\"Status\", \"DECODE READY\");\n\
             int ticks = 42;\n\
             telemetry.addData(\"Ticks\", ticks);\n\
             telemetry.addData(Mode, auto);",
        );
        assert_eq!(
            actions[0],
            Action::Log {
                key: "Status".into(),
                value: "DECODE READY".into()
            }
        );
        assert_eq!(
            actions[2],
            Action::Log {
                key: "Ticks".into(),
                value: "42".into()
            }
        );
        assert_eq!(
            actions[3],
            Action::Log {
                key: "Mode".into(),
                value: "auto".into()
            }
        );
    }

    #[test]
    fn test_telemetry_color_sensor() {
        let src = "String current_artifact_color = \"green\";\n\
                   telemetry.addData(\"Purple\", colorSensor.isPurple());\n\
                   telemetry.addData(\"Green\", colorSensor.isGreen());";
        let actions = parse(src);
        assert_eq!(
            actions[1],
            Action::Log {
                key: "Purple".into(),
                value: "false".into()
            }
        );
        assert_eq!(
            actions[2],
            Action::Log {
                key: "Green".into(),
                value: "true".into()
            }
        );

        // Without the reserved variable both checks read false
        let actions = parse("telemetry.addData(\"Green\", colorSensor.isGreen());");
        assert_eq!(
            actions[0],
            Action::Log {
                key: "Green".into(),
                value: "false".into()
            }
        );
    }

    #[test]
    fn test_malformed_owned_line_is_dropped() {
        // Telemetry owns the line even though it has no comma; nothing else
        // gets a chance at the motor call.
        assert!(parse("telemetry.addData(\"x\") ; motor.setPower(1)").is_empty());
        assert!(parse("motor.setPower;").is_empty());
        assert!(parse("sleep();").is_empty());
    }

    #[test]
    fn test_priority_first_match_wins() {
        // A declaration beats the motor call it mentions
        let actions = parse("double p = motor.setPower(1);");
        assert!(matches!(actions[0], Action::Var { .. }));

        // Drive is checked before shoot
        assert_eq!(
            parse("motor.setPower(0.4); shoot();"),
            vec![Action::Move { power: 0.4 }]
        );
    }

    #[test]
    fn test_intake_is_not_drive() {
        assert_eq!(
            parse("intakeMotor.setPower(-0.5);"),
            vec![Action::Intake { power: -0.5 }]
        );
    }

    #[test]
    fn test_spindexer_and_shoot() {
        assert_eq!(
            parse("spindexer.setPosition(0.8);\nshoot();"),
            vec![Action::Spindexer { pos: 0.8 }, Action::Shoot]
        );
    }

    #[test]
    fn test_sleep_arguments() {
        let actions = parse(
            "sleep(1500);\n\
             Thread.sleep(250);\n\
             int wait = 300;\n\
             sleep(wait);\n\
             sleep(later);\n\
             sleep(-40);\n\
             sleep(12.9);",
        );
        let sleeps: Vec<u64> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Sleep { duration_ms } => Some(*duration_ms),
                _ => None,
            })
            .collect();
        assert_eq!(sleeps, vec![1500, 250, 300, 0, 0, 12]);
    }

    #[test]
    fn test_unresolvable_power_is_zero() {
        assert_eq!(
            parse("motor.setPower(fast);"),
            vec![Action::Move { power: 0.0 }]
        );
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("0.5"), Some(0.5));
        assert_eq!(parse_float_prefix("  -2.5e1xyz"), Some(-25.0));
        assert_eq!(parse_float_prefix(".75"), Some(0.75));
        assert_eq!(parse_float_prefix("5."), Some(5.0));
        assert_eq!(parse_float_prefix("3e"), Some(3.0));
        assert_eq!(parse_float_prefix("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("."), None);
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("2000"), Some(2000.0));
        assert_eq!(parse_int_prefix("12.9"), Some(12.0));
        assert_eq!(parse_int_prefix("-7ms"), Some(-7.0));
        assert_eq!(parse_int_prefix("x1"), None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let src = "double p = 0.7;\nmotor.setPower(p);\nsleep(100);\nshoot();";
        assert_eq!(parse(src), parse(src));
    }

    proptest! {
        #[test]
        fn prop_drive_power_clamped(p in -50.0f64..50.0) {
            let actions = parse(&format!("motor.setPower({p});"));
            match actions.as_slice() {
                [Action::Move { power }] => {
                    prop_assert!((-1.0..=1.0).contains(power));
                    prop_assert_eq!(*power, p.clamp(-1.0, 1.0));
                }
                other => prop_assert!(false, "unexpected actions {:?}", other),
            }
        }

        #[test]
        fn prop_intake_power_clamped(p in -50.0f64..50.0) {
            let actions = parse(&format!("intakeMotor.setPower({p});"));
            prop_assert_eq!(actions, vec![Action::Intake { power: p.clamp(-1.0, 1.0) }]);
        }

        #[test]
        fn prop_spindexer_clamped(p in -50.0f64..50.0) {
            let actions = parse(&format!("spindexer.setPosition({p});"));
            prop_assert_eq!(actions, vec![Action::Spindexer { pos: p.clamp(0.0, 1.0) }]);
        }

        #[test]
        fn prop_unrecognized_lines_produce_nothing(line in "[a-z ]{0,40}") {
            // Every statement shape needs punctuation this alphabet lacks
            prop_assert!(parse(&line).is_empty());
        }
    }
}
