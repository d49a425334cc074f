// ============================================================================
// Structure : CoinInfo
// ============================================================================
// Métadonnées descriptives d'une crypto (GET /v1/coins/{coinId})
//
// CONCEPT RUST : #[serde(default)]
// - coinpaprika omet ou met à null beaucoup de champs selon la crypto
// - Option<T> + default : un champ absent devient None au lieu d'une erreur
// ============================================================================

use serde::{Deserialize, Serialize};

/// Métadonnées d'une cryptomonnaie
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinInfo {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
    pub is_new: bool,
    pub is_active: bool,
    #[serde(rename = "type")]
    pub coin_type: Option<String>,
    pub description: Option<String>,
    pub message: Option<String>,
    pub open_source: Option<bool>,
    pub started_at: Option<String>,
    pub development_status: Option<String>,
    pub hardware_wallet: Option<bool>,
    pub proof_type: Option<String>,
    pub org_structure: Option<String>,
    pub hash_algorithm: Option<String>,
    pub first_data_at: Option<String>,
    pub last_data_at: Option<String>,
}

impl CoinInfo {
    /// Description à afficher (vide si absente)
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Symbole préfixé par "$" comme dans le résumé (ex: "$BTC")
    pub fn display_symbol(&self) -> String {
        format!("${}", self.symbol)
    }

    /// Ligne de caractéristiques techniques (type de preuve, algorithme, etc.)
    ///
    /// Seuls les champs présents sont affichés.
    pub fn technical_flags(&self) -> Vec<(&'static str, String)> {
        let mut flags = Vec::new();

        if let Some(proof) = &self.proof_type {
            flags.push(("Proof", proof.clone()));
        }
        if let Some(algo) = &self.hash_algorithm {
            flags.push(("Hash", algo.clone()));
        }
        if let Some(org) = &self.org_structure {
            flags.push(("Org", org.clone()));
        }
        if let Some(open) = self.open_source {
            flags.push(("Open source", if open { "yes" } else { "no" }.to_string()));
        }
        if let Some(started) = &self.started_at {
            // "2009-01-03T00:00:00Z" → "2009-01-03"
            flags.push(("Started", started.chars().take(10).collect()));
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_missing_fields() {
        let json = r#"{
            "id": "btc-bitcoin",
            "name": "Bitcoin",
            "symbol": "BTC",
            "rank": 1,
            "is_new": false,
            "is_active": true,
            "type": "coin",
            "description": "Bitcoin is a cryptocurrency.",
            "open_source": true,
            "started_at": "2009-01-03T00:00:00Z",
            "proof_type": "Proof of Work",
            "hash_algorithm": null
        }"#;

        let info: CoinInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.display_symbol(), "$BTC");
        assert_eq!(info.description_text(), "Bitcoin is a cryptocurrency.");
        assert!(info.hash_algorithm.is_none());

        let flags = info.technical_flags();
        assert!(flags.contains(&("Proof", "Proof of Work".to_string())));
        assert!(flags.contains(&("Started", "2009-01-03".to_string())));
    }
}
