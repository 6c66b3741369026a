//! Lesson exercises
//!
//! Each lesson carries a short exercise whose checks are regular expressions
//! run over the learner's source. Nothing is parsed or executed here, so
//! control flow and arbitrary Java that the simulator ignores can still be
//! checked for. Unknown lessons fall back to a generic practice block.

use regex::RegexBuilder;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LessonError {
    #[error("check {label:?} has a bad pattern: {source}")]
    Pattern {
        label: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// One pattern a submission must contain
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Check {
    pub label: &'static str,
    pub pattern: &'static str,
    pub hint: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignore_case: bool,
}

const fn check(label: &'static str, pattern: &'static str, hint: &'static str) -> Check {
    Check {
        label,
        pattern,
        hint,
        ignore_case: false,
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub title: &'static str,
    pub prompt: &'static str,
    pub starter_code: &'static str,
    pub checks: &'static [Check],
    pub success_message: &'static str,
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub label: &'static str,
    pub hint: &'static str,
    pub pass: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub lesson_id: String,
    pub exercise: &'static Exercise,
    pub results: Vec<CheckResult>,
    pub all_passed: bool,
}

pub static DEFAULT_EXERCISE: Exercise = Exercise {
    title: "Practice Block",
    prompt: "Write Java related to this lesson and run checks.",
    starter_code: "telemetry.addData(\"Status\", \"Practice\");\ntelemetry.update();\n",
    checks: &[check(
        "Includes at least one Java statement",
        ";",
        "Add a valid Java statement ending with a semicolon.",
    )],
    success_message: "Exercise checks passed.",
};

static EXERCISES: [(&str, Exercise); 17] = [
    (
        "l1",
        Exercise {
            title: "Telemetry Warmup",
            prompt: "Print DECODE READY to telemetry and publish it.",
            starter_code: "telemetry.addData(\"Status\", \"\");\n",
            checks: &[
                check(
                    "Adds DECODE READY status",
                    r#"telemetry\.addData\(\s*"Status"\s*,\s*"DECODE READY"\s*\)"#,
                    "Use telemetry.addData(\"Status\", \"DECODE READY\");",
                ),
                check(
                    "Calls telemetry.update()",
                    r"telemetry\.update\s*\(\s*\)\s*;",
                    "Call telemetry.update();",
                ),
            ],
            success_message: "Initialization telemetry is correct.",
        },
    ),
    (
        "l2",
        Exercise {
            title: "Java Variables",
            prompt: "Declare encoderTicks, motorPower, and isIntakeRunning with the lesson values.",
            starter_code: "// Declare the required variables below\n",
            checks: &[
                check(
                    "int encoderTicks = 500;",
                    r"\bint\s+encoderTicks\s*=\s*500\s*;",
                    "Create int encoderTicks = 500;",
                ),
                check(
                    "double motorPower = 0.5;",
                    r"\bdouble\s+motorPower\s*=\s*0\.5\s*;",
                    "Create double motorPower = 0.5;",
                ),
                check(
                    "boolean isIntakeRunning = false;",
                    r"\bboolean\s+isIntakeRunning\s*=\s*false\s*;",
                    "Create boolean isIntakeRunning = false;",
                ),
            ],
            success_message: "Variable declarations look good.",
        },
    ),
    (
        "l3",
        Exercise {
            title: "OpMode Skeleton",
            prompt: "Inside runOpMode(), call waitForStart() and then set motor power to 0.4.",
            starter_code: "public class MyOpMode extends LinearOpMode {\n  @Override\n  public void runOpMode() {\n    // TODO\n  }\n}\n",
            checks: &[
                check(
                    "Calls waitForStart()",
                    r"waitForStart\s*\(\s*\)\s*;",
                    "Call waitForStart(); before movement.",
                ),
                check(
                    "Sets motor power to 0.4",
                    r"motor\.setPower\s*\(\s*0\.4\s*\)\s*;",
                    "Use motor.setPower(0.4);",
                ),
            ],
            success_message: "Basic LinearOpMode flow passed.",
        },
    ),
    (
        "l4",
        Exercise {
            title: "Input Scaling",
            prompt: "Create scaledDrive using quadratic scaling and send it to motor power.",
            starter_code: "double drive = -gamepad1.left_stick_y;\n",
            checks: &[
                check(
                    "Computes scaledDrive",
                    r"scaledDrive\s*=\s*drive\s*\*\s*Math\.abs\s*\(\s*drive\s*\)",
                    "Use drive * Math.abs(drive).",
                ),
                check(
                    "Sets motor power with scaledDrive",
                    r"motor\.setPower\s*\(\s*scaledDrive\s*\)\s*;",
                    "Call motor.setPower(scaledDrive);",
                ),
            ],
            success_message: "Driver input scaling is correct.",
        },
    ),
    (
        "l5",
        Exercise {
            title: "Mecanum Mix",
            prompt: "Write formulas for fl, fr, bl, br using y, x, rx.",
            starter_code: "double y = -gamepad1.left_stick_y;\ndouble x = gamepad1.left_stick_x;\ndouble rx = gamepad1.right_stick_x;\n",
            checks: &[
                check("Defines fl formula", r"fl\s*=\s*y\s*\+\s*x\s*\+\s*rx\s*;", "fl = y + x + rx;"),
                check("Defines fr formula", r"fr\s*=\s*y\s*-\s*x\s*-\s*rx\s*;", "fr = y - x - rx;"),
            ],
            success_message: "Mecanum equations passed checks.",
        },
    ),
    (
        "l6",
        Exercise {
            title: "Field-Centric Rotation",
            prompt: "Compute botHeading and rotated X/Y using trig.",
            starter_code: "double botHeading = imu.getRobotYawPitchRollAngles().getYaw(AngleUnit.RADIANS);\n",
            checks: &[
                check(
                    "Computes rotX",
                    r"rotX\s*=\s*x\s*\*\s*Math\.cos\s*\(\s*-botHeading\s*\)\s*-\s*y\s*\*\s*Math\.sin\s*\(\s*-botHeading\s*\)",
                    "Use x*cos(-heading) - y*sin(-heading).",
                ),
                check(
                    "Computes rotY",
                    r"rotY\s*=\s*x\s*\*\s*Math\.sin\s*\(\s*-botHeading\s*\)\s*\+\s*y\s*\*\s*Math\.cos\s*\(\s*-botHeading\s*\)",
                    "Use x*sin(-heading) + y*cos(-heading).",
                ),
            ],
            success_message: "Field-centric vector rotation passed.",
        },
    ),
    (
        "l7",
        Exercise {
            title: "Encoder Distance",
            prompt: "Calculate TICKS_PER_INCH and target ticks for 24 inches.",
            starter_code: "double TICKS_PER_REV = 537.7;\ndouble WHEEL_DIAMETER = 3.77;\n",
            checks: &[
                check(
                    "Computes TICKS_PER_INCH",
                    r"TICKS_PER_INCH\s*=\s*TICKS_PER_REV\s*/\s*\(\s*WHEEL_DIAMETER\s*\*\s*Math\.PI\s*\)\s*;",
                    "Use TICKS_PER_REV / (WHEEL_DIAMETER * Math.PI).",
                ),
                check(
                    "Computes target from 24 inches",
                    r"target\s*=\s*\(int\)\s*\(\s*24\s*\*\s*TICKS_PER_INCH\s*\)\s*;",
                    "Cast: (int)(24 * TICKS_PER_INCH).",
                ),
            ],
            success_message: "Encoder math is correct.",
        },
    ),
    (
        "l8",
        Exercise {
            title: "Proportional Control",
            prompt: "Compute error and power = error * Kp.",
            starter_code: "double target = 1000;\ndouble current = 650;\ndouble Kp = 0.05;\n",
            checks: &[
                check("Computes error", r"error\s*=\s*target\s*-\s*current\s*;", "error = target - current;"),
                check("Computes proportional power", r"power\s*=\s*error\s*\*\s*Kp\s*;", "power = error * Kp;"),
            ],
            success_message: "P-loop equations passed.",
        },
    ),
    (
        "l9",
        Exercise {
            title: "I and D Terms",
            prompt: "Declare integral and derivative terms in your control loop.",
            starter_code: "double error = target - current;\n",
            checks: &[
                check("Uses derivative term", "derivative", "Include a derivative variable or expression."),
                check("Uses integral term", "integral", "Include an integral variable or expression."),
            ],
            success_message: "I/D control terms detected.",
        },
    ),
    (
        "l10",
        Exercise {
            title: "Feedforward",
            prompt: "Add a feedforward term and include it in final power.",
            starter_code: "double pid = error * Kp;\n",
            checks: &[
                check("Defines feedforward term", "feedforward", "Create a feedforward variable."),
                check(
                    "Combines PID and feedforward",
                    r"power\s*=\s*pid\s*\+\s*feedforward",
                    "power = pid + feedforward;",
                ),
            ],
            success_message: "Feedforward composition passed.",
        },
    ),
    (
        "l11",
        Exercise {
            title: "Localization Basics",
            prompt: "Read robot X/Y heading and send telemetry.",
            starter_code: "// Use your localization object values\n",
            checks: &[
                check(
                    "References x position",
                    r"\bx\b|posX|getX",
                    "Read x position from your localization source.",
                ),
                check(
                    "Sends telemetry update",
                    r"telemetry\.update\s*\(",
                    "Call telemetry.update(); after adding data.",
                ),
            ],
            success_message: "Localization telemetry check passed.",
        },
    ),
    (
        "l12",
        Exercise {
            title: "AprilTag Detection",
            prompt: "Check tag visibility and branch logic with if/else.",
            starter_code: "// if (tag detected) do something\n",
            checks: &[
                check("Uses if condition", r"\bif\s*\(", "Use an if condition for detection."),
                Check {
                    label: "References april/tag detection",
                    pattern: "april|tag",
                    hint: "Reference tag/april detection variable or object.",
                    ignore_case: true,
                },
            ],
            success_message: "AprilTag control logic looks valid.",
        },
    ),
    (
        "l13",
        Exercise {
            title: "Intake Control",
            prompt: "Power the intake, wait, then stop it.",
            starter_code: "",
            checks: &[
                check(
                    "Starts intake motor",
                    r"intakeMotor\.setPower\s*\(\s*1(\.0)?\s*\)\s*;",
                    "Set intake power to 1.0.",
                ),
                check(
                    "Stops intake motor",
                    r"intakeMotor\.setPower\s*\(\s*0\s*\)\s*;",
                    "Stop intake by setting power to 0.",
                ),
            ],
            success_message: "Intake control sequence passed.",
        },
    ),
    (
        "l14",
        Exercise {
            title: "Spindexer Positioning",
            prompt: "Move the spindexer to one slot position.",
            starter_code: "",
            checks: &[
                check(
                    "Sets spindexer position",
                    r"spindexer\.setPosition\s*\(",
                    "Call spindexer.setPosition(...).",
                ),
                check("Uses 0.2 or 0.8 slot value", r"(0\.2|0\.8)", "Use one of the slot values from lesson."),
            ],
            success_message: "Spindexer position check passed.",
        },
    ),
    (
        "l15",
        Exercise {
            title: "Sorting Logic",
            prompt: "Branch on color sensor and set different spindexer positions.",
            starter_code: "",
            checks: &[
                check(
                    "Uses color condition",
                    r"colorSensor\.isPurple\s*\(",
                    "Branch on colorSensor.isPurple().",
                ),
                check("Contains else branch", r"\belse\b", "Add an else for the alternate color."),
            ],
            success_message: "Color sorting logic checks passed.",
        },
    ),
    (
        "l16",
        Exercise {
            title: "Finite State Machine",
            prompt: "Define at least two states and transition between them.",
            starter_code: "enum State { IDLE, INTAKING }\nState state = State.IDLE;\n",
            checks: &[
                check(
                    "Defines state/enum",
                    r"enum\s+\w+|State\s+\w+",
                    "Use enum State {...} or State variable.",
                ),
                check(
                    "Uses switch or if transition",
                    r"switch\s*\(|if\s*\(",
                    "Add transition logic with switch/if.",
                ),
            ],
            success_message: "FSM structure check passed.",
        },
    ),
    (
        "l17",
        Exercise {
            title: "Autonomous Plan",
            prompt: "Build a simple autonomous sequence with move, turn, and score actions.",
            starter_code: "",
            checks: &[
                check("Includes timing or wait", r"sleep\s*\(", "Use sleep(...) between actions."),
                check(
                    "Includes at least one motor action",
                    r"setPower\s*\(",
                    "Use motor.setPower(...) in your sequence.",
                ),
            ],
            success_message: "Autonomous sequence checks passed.",
        },
    ),
];

/// Ids of every lesson with its own exercise
pub fn lesson_ids() -> impl Iterator<Item = &'static str> {
    EXERCISES.iter().map(|(id, _)| *id)
}

/// Exercise for `lesson_id`, or the practice block for unknown lessons
pub fn exercise(lesson_id: &str) -> &'static Exercise {
    EXERCISES
        .iter()
        .find(|(id, _)| *id == lesson_id)
        .map_or(&DEFAULT_EXERCISE, |(_, exercise)| exercise)
}

/// Run every check of the lesson's exercise over `code`
pub fn run_checks(lesson_id: &str, code: &str) -> Result<CheckReport, LessonError> {
    let exercise = exercise(lesson_id);
    let results = exercise
        .checks
        .iter()
        .map(|check| {
            let regex = RegexBuilder::new(check.pattern)
                .case_insensitive(check.ignore_case)
                .build()
                .map_err(|source| LessonError::Pattern {
                    label: check.label,
                    source,
                })?;
            Ok(CheckResult {
                label: check.label,
                hint: check.hint,
                pass: regex.is_match(code),
            })
        })
        .collect::<Result<Vec<_>, LessonError>>()?;

    let all_passed = results.iter().all(|r| r.pass);
    log::debug!(
        "lesson {lesson_id}: {}/{} checks passed",
        results.iter().filter(|r| r.pass).count(),
        results.len()
    );
    Ok(CheckReport {
        lesson_id: lesson_id.to_string(),
        exercise,
        results,
        all_passed,
    })
}
