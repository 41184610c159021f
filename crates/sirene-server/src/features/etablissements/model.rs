//! Etablissement entity
//!
//! Mirrors the document shape of the Sirene register (camelCase field names,
//! periods ordered most recent first). Fields the API does not model are
//! ignored on decode, including the store's `_id`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sirene_common::types::{Siren, Siret};
use utoipa::ToSchema;

/// Administrative state of an establishment or legal unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EtatAdministratif {
    /// Active
    #[serde(rename = "A")]
    Actif,
    /// Closed
    #[serde(rename = "F")]
    Ferme,
}

impl EtatAdministratif {
    /// Register code as stored in documents
    pub fn code(self) -> &'static str {
        match self {
            EtatAdministratif::Actif => "A",
            EtatAdministratif::Ferme => "F",
        }
    }
}

/// One business establishment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Etablissement {
    #[schema(value_type = String, example = "55208131766522")]
    pub siret: Siret,
    #[schema(value_type = String, example = "552081317")]
    pub siren: Siren,
    #[schema(example = "66522")]
    pub nic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statut_diffusion_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date_creation_etablissement: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tranche_effectifs_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub date_dernier_traitement_etablissement: Option<NaiveDateTime>,
    #[serde(default)]
    pub etablissement_siege: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unite_legale: Option<UniteLegale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adresse_etablissement: Option<AdresseEtablissement>,
    #[serde(default)]
    pub periodes_etablissement: Vec<PeriodeEtablissement>,
}

/// Legal unit the establishment belongs to
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniteLegale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination_unite_legale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigle_unite_legale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categorie_juridique_unite_legale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activite_principale_unite_legale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etat_administratif_unite_legale: Option<EtatAdministratif>,
}

/// Postal address of the establishment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdresseEtablissement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_voie_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_voie_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libelle_voie_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_postal_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libelle_commune_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_commune_etablissement: Option<String>,
}

/// Historised state of the establishment over a date range
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodeEtablissement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date_debut: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date_fin: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etat_administratif_etablissement: Option<EtatAdministratif>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activite_principale_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nomenclature_activite_principale_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enseigne1_etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination_usuelle_etablissement: Option<String>,
}

impl Etablissement {
    /// Most recent period; the register lists periods newest first
    ///
    /// Search criteria on period fields match this same period.
    pub fn current_period(&self) -> Option<&PeriodeEtablissement> {
        self.periodes_etablissement.first()
    }

    pub fn etat_administratif(&self) -> Option<EtatAdministratif> {
        self.current_period()
            .and_then(|p| p.etat_administratif_etablissement)
    }

    pub fn is_active(&self) -> bool {
        self.etat_administratif() == Some(EtatAdministratif::Actif)
    }

    /// Main activity code (NAF) of the current period
    pub fn activite_principale(&self) -> Option<&str> {
        self.current_period()
            .and_then(|p| p.activite_principale_etablissement.as_deref())
    }

    /// Closure date, when the establishment is closed
    pub fn date_fermeture(&self) -> Option<NaiveDate> {
        let current = self.current_period()?;
        if current.etat_administratif_etablissement == Some(EtatAdministratif::Ferme) {
            current.date_debut
        } else {
            None
        }
    }

    /// Best display name: usual denomination, then sign, then legal unit name
    pub fn denomination(&self) -> Option<&str> {
        let period = self.current_period();
        period
            .and_then(|p| p.denomination_usuelle_etablissement.as_deref())
            .or_else(|| period.and_then(|p| p.enseigne1_etablissement.as_deref()))
            .or_else(|| {
                self.unite_legale
                    .as_ref()
                    .and_then(|u| u.denomination_unite_legale.as_deref())
            })
    }
}
