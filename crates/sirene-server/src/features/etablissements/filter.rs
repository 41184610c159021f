//! Search criteria for establishments
//!
//! Every criterion is optional; present criteria are AND-ed. Period-based
//! criteria match the most recent period (index 0), which is the register's
//! current state for the establishment.

use mongodb::bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use sirene_common::types::Siren;
use utoipa::IntoParams;

use super::model::EtatAdministratif;

const DENOMINATION_FIELDS: [&str; 3] = [
    "uniteLegale.denominationUniteLegale",
    "periodesEtablissement.0.denominationUsuelleEtablissement",
    "periodesEtablissement.0.enseigne1Etablissement",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EtablissementFilter {
    /// Legal unit identifier (9 digits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[param(value_type = Option<String>, example = "552081317")]
    pub siren: Option<Siren>,

    /// Case-insensitive substring of the legal unit name, usual name or sign
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination: Option<String>,

    /// Postal code of the establishment address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[param(example = "75008")]
    pub code_postal: Option<String>,

    /// Commune label, matched case-insensitively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commune: Option<String>,

    /// Main activity code (NAF), e.g. `62.01Z`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activite_principale: Option<String>,

    /// `A` for active, `F` for closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[param(value_type = Option<String>, example = "A")]
    pub etat_administratif: Option<EtatAdministratif>,

    /// Restrict to head offices (`true`) or secondary establishments (`false`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siege: Option<bool>,
}

/// Case-insensitive regular expression; the caller escapes user input
fn case_insensitive(pattern: String) -> Document {
    doc! { "$regex": pattern, "$options": "i" }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl EtablissementFilter {
    /// True when no criterion is set, i.e. the request is a plain listing
    pub fn is_empty(&self) -> bool {
        self.siren.is_none()
            && non_blank(&self.denomination).is_none()
            && non_blank(&self.code_postal).is_none()
            && non_blank(&self.commune).is_none()
            && non_blank(&self.activite_principale).is_none()
            && self.etat_administratif.is_none()
            && self.siege.is_none()
    }

    /// Translate the criteria into a store query document
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(siren) = &self.siren {
            filter.insert("siren", siren.as_str());
        }

        if let Some(denomination) = non_blank(&self.denomination) {
            let pattern = regex::escape(denomination);
            let alternatives: Vec<Bson> = DENOMINATION_FIELDS
                .iter()
                .map(|field| {
                    let mut alternative = Document::new();
                    alternative.insert(*field, case_insensitive(pattern.clone()));
                    Bson::Document(alternative)
                })
                .collect();
            filter.insert("$or", alternatives);
        }

        if let Some(code_postal) = non_blank(&self.code_postal) {
            filter.insert("adresseEtablissement.codePostalEtablissement", code_postal);
        }

        if let Some(commune) = non_blank(&self.commune) {
            filter.insert(
                "adresseEtablissement.libelleCommuneEtablissement",
                case_insensitive(format!("^{}$", regex::escape(commune))),
            );
        }

        if let Some(code) = non_blank(&self.activite_principale) {
            filter.insert("periodesEtablissement.0.activitePrincipaleEtablissement", code);
        }

        if let Some(etat) = self.etat_administratif {
            filter.insert("periodesEtablissement.0.etatAdministratifEtablissement", etat.code());
        }

        if let Some(siege) = self.siege {
            filter.insert("etablissementSiege", siege);
        }

        filter
    }
}

#[cfg(test)]
impl EtablissementFilter {
    /// Same semantics as [`EtablissementFilter::to_document`], evaluated in memory
    pub fn matches(&self, etab: &super::model::Etablissement) -> bool {
        let contains = |value: Option<&str>, needle: &str| {
            value.is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
        };
        let latest = etab.current_period();
        let adresse = etab.adresse_etablissement.as_ref();

        if let Some(siren) = &self.siren {
            if &etab.siren != siren {
                return false;
            }
        }

        if let Some(denomination) = non_blank(&self.denomination) {
            let candidates = [
                etab.unite_legale
                    .as_ref()
                    .and_then(|u| u.denomination_unite_legale.as_deref()),
                latest.and_then(|p| p.denomination_usuelle_etablissement.as_deref()),
                latest.and_then(|p| p.enseigne1_etablissement.as_deref()),
            ];
            if !candidates.iter().any(|c| contains(*c, denomination)) {
                return false;
            }
        }

        if let Some(code_postal) = non_blank(&self.code_postal) {
            if adresse.and_then(|a| a.code_postal_etablissement.as_deref()) != Some(code_postal) {
                return false;
            }
        }

        if let Some(commune) = non_blank(&self.commune) {
            let label = adresse.and_then(|a| a.libelle_commune_etablissement.as_deref());
            if !label.is_some_and(|l| l.eq_ignore_ascii_case(commune)) {
                return false;
            }
        }

        if let Some(code) = non_blank(&self.activite_principale) {
            if latest.and_then(|p| p.activite_principale_etablissement.as_deref()) != Some(code) {
                return false;
            }
        }

        if let Some(etat) = self.etat_administratif {
            if latest.and_then(|p| p.etat_administratif_etablissement) != Some(etat) {
                return false;
            }
        }

        if let Some(siege) = self.siege {
            if etab.etablissement_siege != siege {
                return false;
            }
        }

        true
    }
}
