use super::class::Param;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Array(Vec<f64>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamValueError {
    #[error("Parameter '{param}' expects {expected}")]
    WrongShape { param: Param, expected: &'static str },
    #[error("Parameter '{param}' has an invalid number '{value}'")]
    InvalidNumber { param: Param, value: String },
}

impl ParamValue {
    /// Parses the textual form used by tabular formats. Array values are
    /// whitespace separated.
    pub fn parse(param: Param, text: &str) -> Result<Self, ParamValueError> {
        let parse_one = |token: &str| {
            token
                .parse::<f64>()
                .map_err(|_| ParamValueError::InvalidNumber {
                    param,
                    value: token.to_string(),
                })
        };
        if param.is_array() {
            let values = text
                .split_whitespace()
                .map(parse_one)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Self::Array(values))
        } else {
            Ok(Self::Scalar(parse_one(text.trim())?))
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{}", v),
            Self::Array(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

/// The raw parameter set of a cosmology.
///
/// Fields are optional so that a partially specified set can be assembled by
/// readers; [`super::cosmology::CosmologyBuilder`] fills defaults and checks
/// the set against the target class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub h0: Option<f64>,
    pub om0: Option<f64>,
    pub ode0: Option<f64>,
    pub tcmb0: Option<f64>,
    pub neff: Option<f64>,
    pub m_nu: Option<Vec<f64>>,
    pub ob0: Option<f64>,
    pub w0: Option<f64>,
    pub wa: Option<f64>,
    pub wp: Option<f64>,
    pub zp: Option<f64>,
    pub wz: Option<f64>,
}

impl Parameters {
    pub fn get(&self, param: Param) -> Option<ParamValue> {
        if param == Param::MNu {
            return self.m_nu.clone().map(ParamValue::Array);
        }
        self.scalar_slot(param).map(ParamValue::Scalar)
    }

    pub fn set(&mut self, param: Param, value: ParamValue) -> Result<(), ParamValueError> {
        match (param, value) {
            (Param::MNu, ParamValue::Array(values)) => self.m_nu = Some(values),
            (Param::MNu, ParamValue::Scalar(v)) => self.m_nu = Some(vec![v]),
            (_, ParamValue::Array(_)) => {
                return Err(ParamValueError::WrongShape {
                    param,
                    expected: "a scalar",
                });
            }
            (_, ParamValue::Scalar(v)) => {
                if let Some(slot) = self.scalar_slot_mut(param) {
                    *slot = Some(v);
                }
            }
        }
        Ok(())
    }

    /// Parameters that have a value, in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (Param, ParamValue)> + '_ {
        Param::ALL
            .into_iter()
            .filter_map(|param| self.get(param).map(|value| (param, value)))
    }

    fn scalar_slot(&self, param: Param) -> Option<f64> {
        match param {
            Param::H0 => self.h0,
            Param::Om0 => self.om0,
            Param::Ode0 => self.ode0,
            Param::Tcmb0 => self.tcmb0,
            Param::Neff => self.neff,
            Param::Ob0 => self.ob0,
            Param::W0 => self.w0,
            Param::Wa => self.wa,
            Param::Wp => self.wp,
            Param::Zp => self.zp,
            Param::Wz => self.wz,
            Param::MNu => None,
        }
    }

    fn scalar_slot_mut(&mut self, param: Param) -> Option<&mut Option<f64>> {
        let slot = match param {
            Param::H0 => &mut self.h0,
            Param::Om0 => &mut self.om0,
            Param::Ode0 => &mut self.ode0,
            Param::Tcmb0 => &mut self.tcmb0,
            Param::Neff => &mut self.neff,
            Param::Ob0 => &mut self.ob0,
            Param::W0 => &mut self.w0,
            Param::Wa => &mut self.wa,
            Param::Wp => &mut self.wp,
            Param::Zp => &mut self.zp,
            Param::Wz => &mut self.wz,
            Param::MNu => return None,
        };
        Some(slot)
    }
}
