use super::class::{CosmologyClass, Param};
use super::params::{ParamValue, ParamValueError, Parameters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const DEFAULT_NEFF: f64 = 3.04;
const DEFAULT_W0: f64 = -1.0;
const DEFAULT_WA: f64 = 0.0;
const DEFAULT_WP: f64 = -1.0;
const DEFAULT_ZP: f64 = 0.5;
const DEFAULT_WZ: f64 = 0.0;

// Omega_gamma h^2 per K^4 (radiation constant over the critical density at h = 1).
const PHOTON_DENSITY_COEFF: f64 = 4.481_31e-7;
// Massless-neutrino to photon density ratio per effective species: 7/8 (4/11)^(4/3).
const NEUTRINO_PER_PHOTON: f64 = 0.227_107_317_660_239_36;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Class '{0}' is abstract and cannot be instantiated")]
    AbstractClass(CosmologyClass),
    #[error("Missing required parameter '{param}' for class '{class}'")]
    MissingParameter { class: CosmologyClass, param: Param },
    #[error("Parameter '{param}' is not accepted by class '{class}'")]
    UnexpectedParameter { class: CosmologyClass, param: Param },
    #[error("Invalid value for '{param}': {reason}")]
    InvalidValue { param: Param, reason: String },
    #[error(transparent)]
    Value(#[from] ParamValueError),
    #[error("Unknown cosmology class '{0}'")]
    UnknownClass(String),
}

/// A fully validated cosmology instance.
///
/// Instances are only produced by [`CosmologyBuilder::build`], so every
/// parameter the class requires is present and every present parameter is
/// one the class accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CosmologyRecord", into = "CosmologyRecord")]
pub struct Cosmology {
    class: CosmologyClass,
    name: Option<String>,
    parameters: Parameters,
    meta: BTreeMap<String, String>,
}

impl Cosmology {
    pub fn builder(class: CosmologyClass) -> CosmologyBuilder {
        CosmologyBuilder::new(class)
    }

    pub fn class(&self) -> CosmologyClass {
        self.class
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn h0(&self) -> f64 {
        self.parameters.h0.unwrap_or_default()
    }

    pub fn om0(&self) -> f64 {
        self.parameters.om0.unwrap_or_default()
    }

    pub fn tcmb0(&self) -> f64 {
        self.parameters.tcmb0.unwrap_or_default()
    }

    pub fn neff(&self) -> f64 {
        self.parameters.neff.unwrap_or(DEFAULT_NEFF)
    }

    /// Dimensionless Hubble constant, `H0 / (100 km/s/Mpc)`.
    pub fn h(&self) -> f64 {
        self.h0() / 100.0
    }

    pub fn ogamma0(&self) -> f64 {
        PHOTON_DENSITY_COEFF * self.tcmb0().powi(4) / (self.h() * self.h())
    }

    /// Neutrino density, treating every species as massless.
    pub fn onu0(&self) -> f64 {
        NEUTRINO_PER_PHOTON * self.neff() * self.ogamma0()
    }

    /// Dark energy density. Flat classes derive it from the closure relation.
    pub fn ode0(&self) -> f64 {
        match self.parameters.ode0 {
            Some(ode0) => ode0,
            None => 1.0 - self.om0() - self.ogamma0() - self.onu0(),
        }
    }

    pub fn ok0(&self) -> f64 {
        1.0 - self.om0() - self.ode0() - self.ogamma0() - self.onu0()
    }
}

#[derive(Debug, Clone)]
pub struct CosmologyBuilder {
    class: CosmologyClass,
    name: Option<String>,
    parameters: Parameters,
    meta: BTreeMap<String, String>,
}

impl CosmologyBuilder {
    pub fn new(class: CosmologyClass) -> Self {
        Self {
            class,
            name: None,
            parameters: Parameters::default(),
            meta: BTreeMap::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn h0(mut self, h0: f64) -> Self {
        self.parameters.h0 = Some(h0);
        self
    }
    pub fn om0(mut self, om0: f64) -> Self {
        self.parameters.om0 = Some(om0);
        self
    }
    pub fn ode0(mut self, ode0: f64) -> Self {
        self.parameters.ode0 = Some(ode0);
        self
    }
    pub fn tcmb0(mut self, tcmb0: f64) -> Self {
        self.parameters.tcmb0 = Some(tcmb0);
        self
    }
    pub fn neff(mut self, neff: f64) -> Self {
        self.parameters.neff = Some(neff);
        self
    }
    pub fn m_nu(mut self, m_nu: Vec<f64>) -> Self {
        self.parameters.m_nu = Some(m_nu);
        self
    }
    pub fn ob0(mut self, ob0: f64) -> Self {
        self.parameters.ob0 = Some(ob0);
        self
    }
    pub fn w0(mut self, w0: f64) -> Self {
        self.parameters.w0 = Some(w0);
        self
    }
    pub fn wa(mut self, wa: f64) -> Self {
        self.parameters.wa = Some(wa);
        self
    }
    pub fn wp(mut self, wp: f64) -> Self {
        self.parameters.wp = Some(wp);
        self
    }
    pub fn zp(mut self, zp: f64) -> Self {
        self.parameters.zp = Some(zp);
        self
    }
    pub fn wz(mut self, wz: f64) -> Self {
        self.parameters.wz = Some(wz);
        self
    }
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Sets `param` from a parsed value. A scalar given for `m_nu` becomes a
    /// one-element array.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Value`] if an array is given for a scalar parameter.
    pub fn param(mut self, param: Param, value: ParamValue) -> Result<Self, ModelError> {
        self.parameters.set(param, value)?;
        Ok(self)
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Validates the parameters and produces the cosmology.
    ///
    /// Unset optional parameters receive their defaults (`Tcmb0 = 0`,
    /// `Neff = 3.04`, `m_nu = [0]`, and the equation-of-state defaults of the
    /// w classes). The name is trimmed, and a blank name is dropped.
    ///
    /// # Return
    ///
    /// Returns the immutable [`Cosmology`].
    ///
    /// # Errors
    ///
    /// * [`ModelError::AbstractClass`] - the class cannot be instantiated.
    /// * [`ModelError::UnexpectedParameter`] - a parameter the class does not take is set.
    /// * [`ModelError::MissingParameter`] - `H0`, `Om0` or (for curved classes) `Ode0` is unset.
    /// * [`ModelError::InvalidValue`] - a value is non-finite or non-physical,
    ///   or `m_nu` is empty.
    pub fn build(self) -> Result<Cosmology, ModelError> {
        let class = self.class;
        if class.is_abstract() {
            return Err(ModelError::AbstractClass(class));
        }

        let mut parameters = self.parameters;
        for (param, _) in parameters.present() {
            if !class.accepts(param) {
                return Err(ModelError::UnexpectedParameter { class, param });
            }
        }

        let required = [Param::H0, Param::Om0, Param::Ode0];
        for param in required {
            if class.accepts(param) && parameters.get(param).is_none() {
                return Err(ModelError::MissingParameter { class, param });
            }
        }

        parameters.tcmb0.get_or_insert(0.0);
        parameters.neff.get_or_insert(DEFAULT_NEFF);
        parameters.m_nu.get_or_insert_with(|| vec![0.0]);
        if class.accepts(Param::W0) {
            parameters.w0.get_or_insert(DEFAULT_W0);
        }
        if class.accepts(Param::Wa) {
            parameters.wa.get_or_insert(DEFAULT_WA);
        }
        if class.accepts(Param::Wp) {
            parameters.wp.get_or_insert(DEFAULT_WP);
        }
        if class.accepts(Param::Zp) {
            parameters.zp.get_or_insert(DEFAULT_ZP);
        }
        if class.accepts(Param::Wz) {
            parameters.wz.get_or_insert(DEFAULT_WZ);
        }

        validate_values(&parameters)?;

        let name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Cosmology {
            class,
            name,
            parameters,
            meta: self.meta,
        })
    }
}

fn validate_values(parameters: &Parameters) -> Result<(), ModelError> {
    let invalid = |param: Param, reason: &str| ModelError::InvalidValue {
        param,
        reason: reason.to_string(),
    };

    for (param, value) in parameters.present() {
        let finite = match &value {
            ParamValue::Scalar(v) => v.is_finite(),
            ParamValue::Array(values) => values.iter().all(|v| v.is_finite()),
        };
        if !finite {
            return Err(invalid(param, "must be finite"));
        }
    }

    if parameters.h0.is_some_and(|h0| h0 <= 0.0) {
        return Err(invalid(Param::H0, "must be positive"));
    }
    for (param, value) in [
        (Param::Om0, parameters.om0),
        (Param::Tcmb0, parameters.tcmb0),
        (Param::Neff, parameters.neff),
        (Param::Ob0, parameters.ob0),
    ] {
        if value.is_some_and(|v| v < 0.0) {
            return Err(invalid(param, "cannot be negative"));
        }
    }
    if let Some(m_nu) = &parameters.m_nu {
        if m_nu.is_empty() {
            return Err(invalid(Param::MNu, "must hold at least one mass"));
        }
        if m_nu.iter().any(|m| *m < 0.0) {
            return Err(invalid(Param::MNu, "neutrino masses cannot be negative"));
        }
    }
    if let (Some(ob0), Some(om0)) = (parameters.ob0, parameters.om0) {
        if ob0 > om0 {
            return Err(invalid(Param::Ob0, "baryonic density cannot exceed Om0"));
        }
    }
    Ok(())
}

/// Serialized form shared by the document formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CosmologyRecord {
    cosmology: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "H0")]
    h0: Option<f64>,
    #[serde(rename = "Om0")]
    om0: Option<f64>,
    #[serde(rename = "Ode0", default, skip_serializing_if = "Option::is_none")]
    ode0: Option<f64>,
    #[serde(rename = "Tcmb0", default, skip_serializing_if = "Option::is_none")]
    tcmb0: Option<f64>,
    #[serde(rename = "Neff", default, skip_serializing_if = "Option::is_none")]
    neff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    m_nu: Option<Vec<f64>>,
    #[serde(rename = "Ob0", default, skip_serializing_if = "Option::is_none")]
    ob0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    w0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wz: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    meta: BTreeMap<String, String>,
}

impl TryFrom<CosmologyRecord> for Cosmology {
    type Error = ModelError;

    fn try_from(record: CosmologyRecord) -> Result<Self, Self::Error> {
        let class: CosmologyClass = record
            .cosmology
            .parse()
            .map_err(|_| ModelError::UnknownClass(record.cosmology.clone()))?;
        let parameters = Parameters {
            h0: record.h0,
            om0: record.om0,
            ode0: record.ode0,
            tcmb0: record.tcmb0,
            neff: record.neff,
            m_nu: record.m_nu,
            ob0: record.ob0,
            w0: record.w0,
            wa: record.wa,
            wp: record.wp,
            zp: record.zp,
            wz: record.wz,
        };
        let mut builder = CosmologyBuilder::new(class).parameters(parameters);
        builder.name = record.name;
        builder.meta = record.meta;
        builder.build()
    }
}

impl From<Cosmology> for CosmologyRecord {
    fn from(cosmo: Cosmology) -> Self {
        let p = cosmo.parameters;
        Self {
            cosmology: cosmo.class.name().to_string(),
            name: cosmo.name,
            h0: p.h0,
            om0: p.om0,
            ode0: p.ode0,
            tcmb0: p.tcmb0,
            neff: p.neff,
            m_nu: p.m_nu,
            ob0: p.ob0,
            w0: p.w0,
            wa: p.wa,
            wp: p.wp,
            zp: p.zp,
            wz: p.wz,
            meta: cosmo.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planck18_like() -> Cosmology {
        Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .name("Planck18")
            .h0(67.66)
            .om0(0.30966)
            .tcmb0(2.7255)
            .neff(3.046)
            .m_nu(vec![0.0, 0.0, 0.06])
            .ob0(0.04897)
            .build()
            .unwrap()
    }

    #[test]
    fn build_fills_defaults_for_optional_parameters() {
        let cosmo = Cosmology::builder(CosmologyClass::LambdaCdm)
            .h0(70.0)
            .om0(0.3)
            .ode0(0.7)
            .build()
            .unwrap();
        assert_eq!(cosmo.parameters().tcmb0, Some(0.0));
        assert_eq!(cosmo.parameters().neff, Some(DEFAULT_NEFF));
        assert_eq!(cosmo.parameters().m_nu, Some(vec![0.0]));
        assert_eq!(cosmo.parameters().w0, None);
    }

    #[test]
    fn build_fills_equation_of_state_defaults_for_w_classes() {
        let cosmo = Cosmology::builder(CosmologyClass::FlatW0WaCdm)
            .h0(70.0)
            .om0(0.3)
            .build()
            .unwrap();
        assert_eq!(cosmo.parameters().w0, Some(-1.0));
        assert_eq!(cosmo.parameters().wa, Some(0.0));
        assert_eq!(cosmo.parameters().wp, None);
    }

    #[test]
    fn build_rejects_abstract_classes() {
        for class in [CosmologyClass::Cosmology, CosmologyClass::Flrw] {
            let err = Cosmology::builder(class).h0(70.0).om0(0.3).build();
            assert_eq!(err, Err(ModelError::AbstractClass(class)));
        }
    }

    #[test]
    fn build_requires_ode0_for_curved_classes() {
        let err = Cosmology::builder(CosmologyClass::WCdm)
            .h0(70.0)
            .om0(0.3)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingParameter {
                class: CosmologyClass::WCdm,
                param: Param::Ode0
            }
        );
    }

    #[test]
    fn build_rejects_ode0_for_flat_classes() {
        let err = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .h0(70.0)
            .om0(0.3)
            .ode0(0.7)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnexpectedParameter {
                param: Param::Ode0,
                ..
            }
        ));
    }

    #[test]
    fn build_rejects_non_physical_values() {
        let neg_h0 = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .h0(-1.0)
            .om0(0.3)
            .build();
        assert!(matches!(
            neg_h0,
            Err(ModelError::InvalidValue { param: Param::H0, .. })
        ));

        let baryons = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .h0(70.0)
            .om0(0.3)
            .ob0(0.4)
            .build();
        assert!(matches!(
            baryons,
            Err(ModelError::InvalidValue { param: Param::Ob0, .. })
        ));

        let nan = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .h0(f64::NAN)
            .om0(0.3)
            .build();
        assert!(matches!(nan, Err(ModelError::InvalidValue { .. })));
    }

    #[test]
    fn build_rejects_empty_neutrino_masses() {
        let err = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .h0(70.0)
            .om0(0.3)
            .m_nu(vec![])
            .build();
        assert!(matches!(
            err,
            Err(ModelError::InvalidValue { param: Param::MNu, .. })
        ));
    }

    #[test]
    fn build_trims_names_and_drops_blank_ones() {
        let named = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .name("  Planck18 ")
            .h0(70.0)
            .om0(0.3)
            .build()
            .unwrap();
        assert_eq!(named.name(), Some("Planck18"));

        let blank = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .name("")
            .h0(70.0)
            .om0(0.3)
            .build()
            .unwrap();
        assert_eq!(blank.name(), None);
    }

    #[test]
    fn flat_cosmology_has_zero_curvature() {
        let cosmo = planck18_like();
        assert!(cosmo.ok0().abs() < 1e-12);
        assert!(cosmo.ode0() < 1.0 - cosmo.om0());
    }

    #[test]
    fn radiation_vanishes_without_cmb_temperature() {
        let cosmo = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .h0(70.0)
            .om0(0.3)
            .build()
            .unwrap();
        assert_eq!(cosmo.ogamma0(), 0.0);
        assert!((cosmo.ode0() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn photon_density_matches_reference_value() {
        let cosmo = planck18_like();
        let expected = 2.4728e-5 / (cosmo.h() * cosmo.h());
        assert!((cosmo.ogamma0() - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn serde_round_trip_through_record_preserves_everything() {
        let cosmo = planck18_like();
        let json = serde_json::to_string(&cosmo).unwrap();
        assert!(json.contains("\"cosmology\":\"FlatLambdaCDM\""));
        assert!(!json.contains("Ode0"));
        let back: Cosmology = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cosmo);
    }

    #[test]
    fn deserialize_runs_builder_validation() {
        let json = r#"{"cosmology": "FlatLambdaCDM", "H0": 70, "Om0": 0.3, "Ode0": 0.7}"#;
        let err = serde_json::from_str::<Cosmology>(json).unwrap_err();
        assert!(err.to_string().contains("not accepted"));
    }

    #[test]
    fn deserialize_rejects_unknown_fields_and_classes() {
        let unknown_field =
            r#"{"cosmology": "LambdaCDM", "H0": 70, "Om0": 0.3, "Ode0": 0.7, "sigma8": 0.8}"#;
        assert!(serde_json::from_str::<Cosmology>(unknown_field).is_err());

        let unknown_class = r#"{"cosmology": "Einstein-deSitter", "H0": 70, "Om0": 1.0}"#;
        let err = serde_json::from_str::<Cosmology>(unknown_class).unwrap_err();
        assert!(err.to_string().contains("Einstein-deSitter"));
    }
}
