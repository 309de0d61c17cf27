use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The cosmology class hierarchy.
///
/// `Cosmology` is the root of the hierarchy and `Flrw` sits directly beneath it;
/// both are abstract. Every concrete class derives from `Flrw`, and each flat
/// variant derives from its curved counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CosmologyClass {
    #[serde(rename = "Cosmology")]
    Cosmology,
    #[serde(rename = "FLRW")]
    Flrw,
    #[serde(rename = "LambdaCDM")]
    LambdaCdm,
    #[serde(rename = "FlatLambdaCDM")]
    FlatLambdaCdm,
    #[serde(rename = "wCDM")]
    WCdm,
    #[serde(rename = "FlatwCDM")]
    FlatWCdm,
    #[serde(rename = "w0waCDM")]
    W0WaCdm,
    #[serde(rename = "Flatw0waCDM")]
    FlatW0WaCdm,
    #[serde(rename = "wpwaCDM")]
    WpWaCdm,
    #[serde(rename = "w0wzCDM")]
    W0WzCdm,
}

static CLASS_NAMES: Map<&'static str, CosmologyClass> = phf_map! {
    "Cosmology" => CosmologyClass::Cosmology,
    "FLRW" => CosmologyClass::Flrw,
    "LambdaCDM" => CosmologyClass::LambdaCdm,
    "FlatLambdaCDM" => CosmologyClass::FlatLambdaCdm,
    "wCDM" => CosmologyClass::WCdm,
    "FlatwCDM" => CosmologyClass::FlatWCdm,
    "w0waCDM" => CosmologyClass::W0WaCdm,
    "Flatw0waCDM" => CosmologyClass::FlatW0WaCdm,
    "wpwaCDM" => CosmologyClass::WpWaCdm,
    "w0wzCDM" => CosmologyClass::W0WzCdm,
};

impl CosmologyClass {
    pub const ALL: [CosmologyClass; 10] = [
        Self::Cosmology,
        Self::Flrw,
        Self::LambdaCdm,
        Self::FlatLambdaCdm,
        Self::WCdm,
        Self::FlatWCdm,
        Self::W0WaCdm,
        Self::FlatW0WaCdm,
        Self::WpWaCdm,
        Self::W0WzCdm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cosmology => "Cosmology",
            Self::Flrw => "FLRW",
            Self::LambdaCdm => "LambdaCDM",
            Self::FlatLambdaCdm => "FlatLambdaCDM",
            Self::WCdm => "wCDM",
            Self::FlatWCdm => "FlatwCDM",
            Self::W0WaCdm => "w0waCDM",
            Self::FlatW0WaCdm => "Flatw0waCDM",
            Self::WpWaCdm => "wpwaCDM",
            Self::W0WzCdm => "w0wzCDM",
        }
    }

    /// The direct superclass, or `None` for the root.
    pub fn parent(self) -> Option<CosmologyClass> {
        match self {
            Self::Cosmology => None,
            Self::Flrw => Some(Self::Cosmology),
            Self::LambdaCdm | Self::WCdm | Self::W0WaCdm | Self::WpWaCdm | Self::W0WzCdm => {
                Some(Self::Flrw)
            }
            Self::FlatLambdaCdm => Some(Self::LambdaCdm),
            Self::FlatWCdm => Some(Self::WCdm),
            Self::FlatW0WaCdm => Some(Self::W0WaCdm),
        }
    }

    /// The class itself followed by each of its ancestors up to the root.
    pub fn lineage(self) -> impl Iterator<Item = CosmologyClass> {
        std::iter::successors(Some(self), |class| class.parent())
    }

    /// Reflexive: every class is a subclass of itself.
    pub fn is_subclass_of(self, other: CosmologyClass) -> bool {
        self.lineage().any(|class| class == other)
    }

    pub fn is_base(self) -> bool {
        self == Self::Cosmology
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, Self::Cosmology | Self::Flrw)
    }

    pub fn is_flat(self) -> bool {
        matches!(
            self,
            Self::FlatLambdaCdm | Self::FlatWCdm | Self::FlatW0WaCdm
        )
    }

    /// Whether instances of this class carry the given parameter.
    ///
    /// Flat classes derive `Ode0` and therefore do not accept it.
    pub fn accepts(self, param: Param) -> bool {
        match param {
            Param::H0 | Param::Om0 | Param::Tcmb0 | Param::Neff | Param::MNu | Param::Ob0 => {
                !self.is_abstract()
            }
            Param::Ode0 => !self.is_abstract() && !self.is_flat(),
            Param::W0 => matches!(
                self,
                Self::WCdm | Self::FlatWCdm | Self::W0WaCdm | Self::FlatW0WaCdm | Self::W0WzCdm
            ),
            Param::Wa => matches!(self, Self::W0WaCdm | Self::FlatW0WaCdm | Self::WpWaCdm),
            Param::Wp | Param::Zp => self == Self::WpWaCdm,
            Param::Wz => self == Self::W0WzCdm,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown cosmology class '{0}'")]
pub struct ParseClassError(pub String);

impl FromStr for CosmologyClass {
    type Err = ParseClassError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CLASS_NAMES
            .get(s.trim())
            .copied()
            .ok_or_else(|| ParseClassError(s.to_string()))
    }
}

impl fmt::Display for CosmologyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named cosmological parameters, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    H0,
    Om0,
    Ode0,
    Tcmb0,
    Neff,
    MNu,
    Ob0,
    W0,
    Wa,
    Wp,
    Zp,
    Wz,
}

static PARAM_NAMES: Map<&'static str, Param> = phf_map! {
    "H0" => Param::H0,
    "Om0" => Param::Om0,
    "Ode0" => Param::Ode0,
    "Tcmb0" => Param::Tcmb0,
    "Neff" => Param::Neff,
    "m_nu" => Param::MNu,
    "Ob0" => Param::Ob0,
    "w0" => Param::W0,
    "wa" => Param::Wa,
    "wp" => Param::Wp,
    "zp" => Param::Zp,
    "wz" => Param::Wz,
};

impl Param {
    pub const ALL: [Param; 12] = [
        Self::H0,
        Self::Om0,
        Self::Ode0,
        Self::Tcmb0,
        Self::Neff,
        Self::MNu,
        Self::Ob0,
        Self::W0,
        Self::Wa,
        Self::Wp,
        Self::Zp,
        Self::Wz,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::H0 => "H0",
            Self::Om0 => "Om0",
            Self::Ode0 => "Ode0",
            Self::Tcmb0 => "Tcmb0",
            Self::Neff => "Neff",
            Self::MNu => "m_nu",
            Self::Ob0 => "Ob0",
            Self::W0 => "w0",
            Self::Wa => "wa",
            Self::Wp => "wp",
            Self::Zp => "zp",
            Self::Wz => "wz",
        }
    }

    pub fn latex(self) -> &'static str {
        match self {
            Self::H0 => "$H_0$",
            Self::Om0 => "$\\Omega_{m,0}$",
            Self::Ode0 => "$\\Omega_{\\Lambda,0}$",
            Self::Tcmb0 => "$T_{0}$",
            Self::Neff => "$N_{eff}$",
            Self::MNu => "$m_{nu}$",
            Self::Ob0 => "$\\Omega_{b,0}$",
            Self::W0 => "$w_{0}$",
            Self::Wa => "$w_{a}$",
            Self::Wp => "$w_{p}$",
            Self::Zp => "$z_{p}$",
            Self::Wz => "$w_{z}$",
        }
    }

    pub fn is_array(self) -> bool {
        self == Self::MNu
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown cosmological parameter '{0}'")]
pub struct ParseParamError(pub String);

impl FromStr for Param {
    type Err = ParseParamError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PARAM_NAMES
            .get(s.trim())
            .copied()
            .ok_or_else(|| ParseParamError(s.to_string()))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
