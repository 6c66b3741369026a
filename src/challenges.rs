//! Challenge catalog
//!
//! Each challenge pairs starter code with a predicate over the state a run
//! finished in. Progress tracking and points bookkeeping live with the host.

use serde::Serialize;

use crate::sim::SimState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Verdict on a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub success: bool,
    pub message: &'static str,
}

impl Validation {
    fn verdict(success: bool, pass: &'static str, fail: &'static str) -> Self {
        Self {
            success,
            message: if success { pass } else { fail },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Lesson the challenge belongs to
    pub lesson_id: &'static str,
    pub difficulty: Difficulty,
    pub points: u32,
    pub starter_code: &'static str,
    pub solution_code: &'static str,
    pub hints: &'static [&'static str],
    #[serde(skip)]
    pub validate: fn(&SimState) -> Validation,
}

impl Challenge {
    /// Judge a finished run
    pub fn check(&self, state: &SimState) -> Validation {
        (self.validate)(state)
    }
}

static CATALOG: [Challenge; 5] = [
    Challenge {
        id: "c1",
        title: "Launch Initialization",
        description: "Print \"DECODE_ACTIVE\" to the telemetry.",
        lesson_id: "l1",
        difficulty: Difficulty::Beginner,
        points: 10,
        starter_code: "telemetry.addData(\"Status\", \"...\");\ntelemetry.update();",
        solution_code: "telemetry.addData(\"Status\", \"DECODE_ACTIVE\");\ntelemetry.update();",
        hints: &["Text must be exactly \"DECODE_ACTIVE\""],
        validate: |state| {
            Validation::verdict(
                state.logs.iter().any(|l| l.contains("Status: DECODE_ACTIVE")),
                "Systems Go!",
                "Telemetry message incorrect.",
            )
        },
    },
    Challenge {
        id: "c2",
        title: "First Drive",
        description: "Drive forward at 50% power for 2 seconds and stop.",
        lesson_id: "l3",
        difficulty: Difficulty::Beginner,
        points: 20,
        starter_code: "motor.setPower(0.5);\nsleep(0);\nmotor.setPower(0);",
        solution_code: "motor.setPower(0.5);\nsleep(2000);\nmotor.setPower(0);",
        hints: &["2 seconds = 2000ms"],
        validate: |state| {
            Validation::verdict(
                state.y < 240.0 && state.left_power == 0.0,
                "Launch successful!",
                "Robot didn't stop or move far enough.",
            )
        },
    },
    Challenge {
        id: "c3",
        title: "Precision Pivot",
        description: "Rotate the robot at 30% power for 1 second. \
                      (Negative power rotates the robot in the simulator).",
        lesson_id: "l3",
        difficulty: Difficulty::Beginner,
        points: 30,
        starter_code: "motor.setPower(-0.3);\nsleep(1000);\nmotor.setPower(0);",
        solution_code: "motor.setPower(-0.3);\nsleep(1000);\nmotor.setPower(0);",
        hints: &["Rotation is triggered by negative power in this simulator"],
        validate: |state| {
            Validation::verdict(
                state.rotation > 10.0 && state.left_power == 0.0,
                "Pivot complete!",
                "Robot didn't rotate enough.",
            )
        },
    },
    Challenge {
        id: "c4",
        title: "Intake Activation",
        description: "Activate the intake motor at full power for 3 seconds \
                      to prepare for artifact collection.",
        lesson_id: "l13",
        difficulty: Difficulty::Intermediate,
        points: 40,
        starter_code: "intakeMotor.setPower(1.0);\nsleep(3000);\nintakeMotor.setPower(0);",
        solution_code: "intakeMotor.setPower(1.0);\nsleep(3000);\nintakeMotor.setPower(0);",
        hints: &["Use intakeMotor.setPower(1.0)"],
        validate: |state| {
            Validation::verdict(
                state.intake_power == 0.0,
                "Intake systems verified!",
                "Make sure to stop the motor after 3 seconds.",
            )
        },
    },
    Challenge {
        id: "c12",
        title: "Intake and Sort",
        description: "Drive forward to grab a ball. If it is PURPLE, rotate \
                      spindexer to 0.8. If GREEN, rotate to 0.2. Then shoot!",
        lesson_id: "l15",
        difficulty: Difficulty::Advanced,
        points: 100,
        starter_code: "intakeMotor.setPower(1.0);
motor.setPower(0.4);
sleep(2500);
motor.setPower(0);
intakeMotor.setPower(0);

// Simulator color logic
if (colorSensor.isPurple()) {
  spindexer.setPosition(0.8);
} else {
  spindexer.setPosition(0.2);
}

sleep(1000);
shoot();",
        solution_code: "intakeMotor.setPower(1.0);
motor.setPower(0.4);
sleep(2500);
motor.setPower(0);
intakeMotor.setPower(0);
if (colorSensor.isPurple()) {
  spindexer.setPosition(0.8);
} else {
  spindexer.setPosition(0.2);
}
sleep(1000);
shoot();",
        hints: &[
            "Check color with colorSensor.isPurple()",
            "Purple slot is 0.8",
            "Green slot is 0.2",
        ],
        validate: |state| {
            Validation::verdict(
                state.spindexer_position > 0.0
                    && !state.is_running
                    && state.held_artifact.is_none(),
                "Advanced Sorting Successful!",
                "Ensure you rotate the spindexer before shooting.",
            )
        },
    },
];

/// Every challenge, in catalog order
pub fn catalog() -> &'static [Challenge] {
    &CATALOG
}

pub fn find(id: &str) -> Option<&'static Challenge> {
    CATALOG.iter().find(|c| c.id == id)
}

/// Sum of points over the catalog
pub fn total_points() -> u32 {
    CATALOG.iter().map(|c| c.points).sum()
}
