use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShellError;

/// Response envelope wrapping every API result
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Registered system (id and profile name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSummary {
    pub id: i64,
    pub name: String,
}

/// Software channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareChannel {
    pub label: String,
    #[serde(default)]
    pub parent_label: Option<String>,
}

impl SoftwareChannel {
    /// A channel without a parent is a base channel
    pub fn is_base(&self) -> bool {
        self.parent_label.as_deref().map_or(true, str::is_empty)
    }

    /// Whether this channel is a child of `parent`
    pub fn is_child_of(&self, parent: &str) -> bool {
        self.parent_label.as_deref() == Some(parent)
    }
}

/// Package build as listed in a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub release: String,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default, alias = "arch_label")]
    pub arch: Option<String>,
}

impl PackageSummary {
    /// Full package name: `name-[epoch:]version-release[.arch]`
    pub fn long_name(&self) -> String {
        let epoch = self
            .epoch
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        let mut name = match epoch {
            Some(epoch) => format!("{}-{}:{}-{}", self.name, epoch, self.version, self.release),
            None => format!("{}-{}-{}", self.name, self.version, self.release),
        };

        if let Some(arch) = self.arch.as_deref().filter(|a| !a.is_empty()) {
            name.push('.');
            name.push_str(arch);
        }

        name
    }
}

/// Erratum (advisory) record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erratum {
    pub id: i64,
    pub advisory_name: String,
    #[serde(default)]
    pub advisory_type: String,
    #[serde(default)]
    pub advisory_status: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub advisory_synopsis: String,
}

/// Fields a system search can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchField {
    Id,
    Name,
    Ip,
    Hostname,
    Device,
    Vendor,
    Driver,
    Uuid,
}

impl SearchField {
    /// All searchable fields, in help order
    pub const ALL: [SearchField; 8] = [
        Self::Id,
        Self::Name,
        Self::Ip,
        Self::Hostname,
        Self::Device,
        Self::Vendor,
        Self::Driver,
        Self::Uuid,
    ];

    /// Field name as written in `search:<field>:<query>`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Ip => "ip",
            Self::Hostname => "hostname",
            Self::Device => "device",
            Self::Vendor => "vendor",
            Self::Driver => "driver",
            Self::Uuid => "uuid",
        }
    }

    /// Server search method for this field; `None` for fields matched locally
    pub fn endpoint(self) -> Option<&'static str> {
        match self {
            Self::Id => None,
            Self::Name => Some("/system/search/nameAndDescription"),
            Self::Ip => Some("/system/search/ip"),
            Self::Hostname => Some("/system/search/hostname"),
            Self::Device => Some("/system/search/deviceDescription"),
            Self::Vendor => Some("/system/search/deviceVendorId"),
            Self::Driver => Some("/system/search/deviceDriver"),
            Self::Uuid => Some("/system/search/uuid"),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == lower)
            .ok_or_else(|| {
                ShellError::InvalidArgument(format!(
                    "Unknown search field '{}'. Valid fields: id, name, ip, hostname, device, vendor, driver, uuid",
                    s
                ))
            })
    }
}
