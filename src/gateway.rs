//! Device gateway: drives the external DDC/CI tool (`m1ddc get|set|chg <key> [value]`).
//!
//! [`DisplayControl`] is the raw tool boundary and reports typed errors.
//! [`Gateway`] sits in front of it for the UI: failures are logged, turned into
//! the sentinel value `0` and remembered for the status bar.

use std::io;
use std::num::ParseIntError;
use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::params::{ParamKind, Parameter};

/// Value reported for any failed gateway operation.
pub const SENTINEL: i32 = 0;

/// Offset of the tool's relative-change primitive on the red/green/blue channels.
pub const RGB_BIAS: i32 = 50;

/// Valid range of a value read back from the tool.
pub const VALUE_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program} {args}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{program} {args}` printed {output:?}, expected an integer")]
    Unparsable {
        program: String,
        args: String,
        output: String,
        #[source]
        source: ParseIntError,
    },

    #[error("{key} reads {value}, outside 0..=100")]
    OutOfRange { key: String, value: i32 },

    #[error("{key} change by {delta} from {current} overflows")]
    Overflow {
        key: String,
        current: i32,
        delta: i32,
    },
}

/// Raw operations of the display-control tool.
pub trait DisplayControl {
    fn get(&mut self, key: &str) -> Result<i32, GatewayError>;
    /// Returns the value actually applied.
    fn set(&mut self, key: &str, value: i32) -> Result<i32, GatewayError>;
    /// Returns the resulting absolute value.
    fn change(&mut self, key: &str, delta: i32) -> Result<i32, GatewayError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
//  m1ddc process backend
// ═══════════════════════════════════════════════════════════════════════════════

pub struct M1ddc {
    program: String,
}

impl M1ddc {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the tool and return its trimmed stdout. Blocks until the process exits.
    fn run(&self, args: &[&str]) -> Result<String, GatewayError> {
        log::debug!("exec {} {}", self.program, args.join(" "));
        let out = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| GatewayError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !out.status.success() {
            return Err(GatewayError::Failed {
                program: self.program.clone(),
                args: args.join(" "),
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    fn run_int(&self, args: &[&str]) -> Result<i32, GatewayError> {
        let output = self.run(args)?;
        parse_value(&output).map_err(|source| GatewayError::Unparsable {
            program: self.program.clone(),
            args: args.join(" "),
            output,
            source,
        })
    }
}

fn parse_value(s: &str) -> Result<i32, ParseIntError> {
    s.trim().parse()
}

impl DisplayControl for M1ddc {
    fn get(&mut self, key: &str) -> Result<i32, GatewayError> {
        self.run_int(&["get", key])
    }

    fn set(&mut self, key: &str, value: i32) -> Result<i32, GatewayError> {
        let v = value.to_string();
        let output = self.run(&["set", key, &v])?;
        // Some builds echo the applied value; otherwise the request stands.
        Ok(parse_value(&output).unwrap_or(value))
    }

    fn change(&mut self, key: &str, delta: i32) -> Result<i32, GatewayError> {
        let d = delta.to_string();
        self.run_int(&["chg", key, &d])
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Gateway adapter
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Gateway<C> {
    control: C,
    last_failure: Option<String>,
}

impl<C: DisplayControl> Gateway<C> {
    pub fn new(control: C) -> Self {
        Self {
            control,
            last_failure: None,
        }
    }

    pub fn get(&mut self, param: &Parameter) -> i32 {
        let r = self.control.get(param.device_key).and_then(|v| in_range(param, v));
        self.settle(param, "get", r)
    }

    pub fn set(&mut self, param: &Parameter, value: i32) -> i32 {
        let r = self.control.set(param.device_key, value);
        self.settle(param, "set", r)
    }

    /// Adjust by `delta`, returning the tool's resulting absolute value.
    ///
    /// Color channels skip the biased `chg` primitive: the current value is read
    /// and `current + delta - RGB_BIAS` is written with `set`. If that read
    /// fails or lies outside 0..=100, nothing is written.
    pub fn change_by(&mut self, param: &Parameter, delta: i32) -> i32 {
        match param.kind {
            ParamKind::Standard => {
                let r = self
                    .control
                    .change(param.device_key, delta)
                    .and_then(|v| in_range(param, v));
                self.settle(param, "chg", r)
            }
            ParamKind::ColorChannel => {
                let r = self
                    .control
                    .get(param.device_key)
                    .and_then(|cur| in_range(param, cur))
                    .and_then(|cur| compensated(param, cur, delta))
                    .and_then(|target| self.control.set(param.device_key, target));
                self.settle(param, "chg", r)
            }
        }
    }

    /// Take the message of the most recent failure, if any, since the last call.
    pub fn take_failure(&mut self) -> Option<String> {
        self.last_failure.take()
    }

    #[cfg(test)]
    pub fn control(&self) -> &C {
        &self.control
    }

    fn settle(&mut self, param: &Parameter, op: &str, r: Result<i32, GatewayError>) -> i32 {
        match r {
            Ok(v) => v,
            Err(e) => {
                log::warn!("{op} {} failed: {e}", param.device_key);
                self.last_failure = Some(format!("{} {op}: {e}", param.label));
                SENTINEL
            }
        }
    }
}

fn in_range(param: &Parameter, value: i32) -> Result<i32, GatewayError> {
    if VALUE_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(GatewayError::OutOfRange {
            key: param.device_key.into(),
            value,
        })
    }
}

/// `current + delta - RGB_BIAS`, the value `set` needs to move a colour channel by `delta`.
fn compensated(param: &Parameter, current: i32, delta: i32) -> Result<i32, GatewayError> {
    current
        .checked_add(delta)
        .and_then(|v| v.checked_sub(RGB_BIAS))
        .ok_or_else(|| GatewayError::Overflow {
            key: param.device_key.into(),
            current,
            delta,
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Test double
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Get(String),
        Set(String, i32),
        Change(String, i32),
    }

    /// In-memory display: values clamp to 0..=100, every call is recorded.
    #[derive(Default)]
    pub struct FakeDisplay {
        pub values: HashMap<String, i32>,
        pub calls: Vec<Call>,
        pub broken: Vec<String>,
    }

    impl FakeDisplay {
        pub fn with(values: &[(&str, i32)]) -> Self {
            Self {
                values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                ..Default::default()
            }
        }

        pub fn break_key(mut self, key: &str) -> Self {
            self.broken.push(key.to_string());
            self
        }

        fn check(&self, key: &str) -> Result<(), GatewayError> {
            if self.broken.iter().any(|k| k == key) {
                let source = "n/a".parse::<i32>().unwrap_err();
                return Err(GatewayError::Unparsable {
                    program: "fake".into(),
                    args: key.into(),
                    output: "n/a".into(),
                    source,
                });
            }
            Ok(())
        }
    }

    impl DisplayControl for FakeDisplay {
        fn get(&mut self, key: &str) -> Result<i32, GatewayError> {
            self.calls.push(Call::Get(key.into()));
            self.check(key)?;
            Ok(*self.values.get(key).unwrap_or(&0))
        }

        fn set(&mut self, key: &str, value: i32) -> Result<i32, GatewayError> {
            self.calls.push(Call::Set(key.into(), value));
            self.check(key)?;
            let v = value.clamp(0, 100);
            self.values.insert(key.into(), v);
            Ok(v)
        }

        fn change(&mut self, key: &str, delta: i32) -> Result<i32, GatewayError> {
            self.calls.push(Call::Change(key.into(), delta));
            self.check(key)?;
            let v = (self.values.get(key).unwrap_or(&0) + delta).clamp(0, 100);
            self.values.insert(key.into(), v);
            Ok(v)
        }
    }
}
