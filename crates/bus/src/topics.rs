// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed control-bus topic grammar (spec §4.2). Pure string
//! construction/parsing — no transport concerns live here.

/// `pioreactor/<unit>/<experiment>/<job>/<setting>/set`
pub fn setting_set(unit: &str, experiment: &str, job: &str, setting: &str) -> String {
    format!("pioreactor/{unit}/{experiment}/{job}/{setting}/set")
}

/// `pioreactor/<unit>/<experiment>/<job>/$state/set`
pub fn state_set(unit: &str, experiment: &str, job: &str) -> String {
    format!("pioreactor/{unit}/{experiment}/{job}/$state/set")
}

/// `pioreactor/<unit>/<experiment>/logs/<source>/<level>`
pub fn logs(unit: &str, experiment: &str, source: &str, level: &str) -> String {
    format!("pioreactor/{unit}/{experiment}/logs/{source}/{level}")
}

/// `pioreactor/<unit>/<experiment>/monitor/flicker_led_response_okay`
pub fn flicker(unit: &str, experiment: &str) -> String {
    format!("pioreactor/{unit}/{experiment}/monitor/flicker_led_response_okay")
}

/// Job lifecycle states a `$state/set` command may request (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Ready,
    Sleeping,
    Disconnected,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Ready => "ready",
            JobState::Sleeping => "sleeping",
            JobState::Disconnected => "disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_setting_topic() {
        assert_eq!(
            setting_set("u1", "exp1", "stirring", "target_rpm"),
            "pioreactor/u1/exp1/stirring/target_rpm/set"
        );
    }

    #[test]
    fn builds_state_topic() {
        assert_eq!(state_set("u1", "exp1", "stirring"), "pioreactor/u1/exp1/stirring/$state/set");
    }

    #[test]
    fn builds_logs_topic() {
        assert_eq!(logs("u1", "exp1", "app", "ERROR"), "pioreactor/u1/exp1/logs/app/ERROR");
    }

    #[test]
    fn job_state_renders_lowercase() {
        assert_eq!(JobState::Disconnected.as_str(), "disconnected");
    }
}
