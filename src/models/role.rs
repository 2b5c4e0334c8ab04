// scoutshare-service/src/models/role.rs
//! Role registry. Every place that needs to know what a role means asks here
//! instead of matching on role names itself.

use crate::models::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Scouter,
    Driver,
    Engineer,
    Technician,
    Viewer,
}

const ALL_ROLES: [Role; 6] = [
    Role::Admin,
    Role::Scouter,
    Role::Driver,
    Role::Engineer,
    Role::Technician,
    Role::Viewer,
];

impl Role {
    /// All roles in display order, most privileged first.
    pub fn all() -> &'static [Role] {
        &ALL_ROLES
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Scouter => "scouter",
            Role::Driver => "driver",
            Role::Engineer => "engineer",
            Role::Technician => "technician",
            Role::Viewer => "viewer",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Role::Admin => "Full access: manages sharing and every checklist",
            Role::Scouter => "Records match and pit scouting data",
            Role::Driver => "Scouting data plus the driver checklist",
            Role::Engineer => "Scouting data plus the engineer checklist",
            Role::Technician => "Scouting data plus the technician checklist",
            Role::Viewer => "Read-only access to the event",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Role::Admin => "👑",
            Role::Scouter => "📋",
            Role::Driver => "🎮",
            Role::Engineer => "🔧",
            Role::Technician => "🔩",
            Role::Viewer => "👁",
        }
    }

    /// Capability level: 0 is read-only, 1 may write scouting data,
    /// 2 may write data and manage sharing.
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 2,
            Role::Scouter | Role::Driver | Role::Engineer | Role::Technician => 1,
            Role::Viewer => 0,
        }
    }

    /// The checklist this role works from, if any.
    pub fn checklist_scope(&self) -> Option<ChecklistScope> {
        match self {
            Role::Driver => Some(ChecklistScope::Driver),
            Role::Engineer => Some(ChecklistScope::Engineer),
            Role::Technician => Some(ChecklistScope::Technician),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Scouter
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_ROLES
            .iter()
            .copied()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| ServiceError::Validation(format!("Unknown role: {}", s)))
    }
}

// Role-scoped checklists exist only for these three roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistScope {
    Driver,
    Engineer,
    Technician,
}

impl ChecklistScope {
    pub fn all() -> &'static [ChecklistScope] {
        &[
            ChecklistScope::Driver,
            ChecklistScope::Engineer,
            ChecklistScope::Technician,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistScope::Driver => "driver",
            ChecklistScope::Engineer => "engineer",
            ChecklistScope::Technician => "technician",
        }
    }

    pub fn role(&self) -> Role {
        match self {
            ChecklistScope::Driver => Role::Driver,
            ChecklistScope::Engineer => Role::Engineer,
            ChecklistScope::Technician => Role::Technician,
        }
    }
}

impl fmt::Display for ChecklistScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChecklistScope {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Role>()?.checklist_scope() {
            Some(scope) => Ok(scope),
            None => Err(ServiceError::Validation(format!(
                "Role {} has no checklist",
                s
            ))),
        }
    }
}

// Registry entry served to clients
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RoleInfo {
    pub role: Role,
    pub description: String,
    pub icon: String,
    pub level: u8,
}

pub fn describe(role: Role) -> &'static str {
    role.describe()
}

pub fn icon(role: Role) -> &'static str {
    role.icon()
}

pub fn all_roles() -> Vec<RoleInfo> {
    Role::all()
        .iter()
        .map(|role| RoleInfo {
            role: *role,
            description: role.describe().to_string(),
            icon: role.icon().to_string(),
            level: role.level(),
        })
        .collect()
}
