//! Session Identity
//!
//! A `Session` is created once at login and names who is being coached, in
//! which store role, and through which interaction mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a role or mode label is not one of the fixed values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseLabelError {
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),
    #[error("Unknown interaction mode: '{0}'")]
    UnknownMode(String),
}

/// The store roles a trainee can practise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Pramuniaga,
    AdminSosmed,
    Kasir,
    HostLive,
    PemasangSenar,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Pramuniaga,
        UserRole::AdminSosmed,
        UserRole::Kasir,
        UserRole::HostLive,
        UserRole::PemasangSenar,
    ];

    /// The human-facing label, as shown in prompts and on the login form.
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Pramuniaga => "Pramuniaga",
            UserRole::AdminSosmed => "Admin Sosial Media",
            UserRole::Kasir => "Kasir",
            UserRole::HostLive => "Host Live",
            UserRole::PemasangSenar => "Pemasang Senar",
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            UserRole::Pramuniaga => "pramuniaga",
            UserRole::AdminSosmed => "admin_sosmed",
            UserRole::Kasir => "kasir",
            UserRole::HostLive => "host_live",
            UserRole::PemasangSenar => "pemasang_senar",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UserRole {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        UserRole::ALL
            .into_iter()
            .find(|role| {
                role.label().eq_ignore_ascii_case(wanted)
                    || role.variant_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ParseLabelError::UnknownRole(s.to_string()))
    }
}

/// The three ways a trainee can interact with the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    Qa,
    Quiz,
    Simulation,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 3] = [
        InteractionMode::Qa,
        InteractionMode::Quiz,
        InteractionMode::Simulation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InteractionMode::Qa => "Tanya-Jawab",
            InteractionMode::Quiz => "Kuis Interaktif",
            InteractionMode::Simulation => "Simulasi",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            InteractionMode::Qa => &["qa"],
            InteractionMode::Quiz => &["quiz", "kuis"],
            InteractionMode::Simulation => &["simulation"],
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InteractionMode {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        InteractionMode::ALL
            .into_iter()
            .find(|mode| {
                mode.label().eq_ignore_ascii_case(wanted)
                    || mode.aliases().iter().any(|a| a.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| ParseLabelError::UnknownMode(s.to_string()))
    }
}

/// Who is being coached and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_name: String,
    pub user_role: UserRole,
    pub mode: InteractionMode,
}

impl Session {
    /// Builds a session, rejecting a blank user name.
    pub fn new(user_name: &str, user_role: UserRole, mode: InteractionMode) -> Option<Self> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return None;
        }
        Some(Self {
            user_name: user_name.to_string(),
            user_role,
            mode,
        })
    }

    /// The welcome line shown right after login.
    pub fn greeting(&self) -> String {
        format!(
            "Halo {}! Saya Alma, siap membantu Anda mengembangkan peran sebagai {} di Toko GoBIG.",
            self.user_name, self.user_role
        )
    }

    /// The single turn a history is reset to when a new simulation starts.
    pub fn new_simulation_greeting(&self) -> String {
        format!(
            "Sesi sebelumnya telah selesai. Halo lagi, {}! Siap untuk memulai topik simulasi baru sebagai {}?",
            self.user_name, self.user_role
        )
    }
}
