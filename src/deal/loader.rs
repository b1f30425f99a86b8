//! Load deals (JSON) and waterfall tier schedules (CSV)

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::Reader;

use super::{DealAssumptions, WaterfallTier};
use crate::error::{ProformaError, ProformaResult};

/// Raw CSV row for a waterfall schedule
#[derive(Debug, serde::Deserialize)]
struct TierRow {
    order: u32,
    name: String,
    /// Empty cell marks the residual tier
    hurdle_rate: Option<f64>,
    lp_split: f64,
    gp_split: f64,
}

impl TierRow {
    fn into_tier(self) -> ProformaResult<WaterfallTier> {
        if self.name.trim().is_empty() {
            return Err(ProformaError::invalid(
                "name",
                format!("tier {} has an empty name", self.order),
            ));
        }
        Ok(WaterfallTier {
            order: self.order,
            name: self.name,
            hurdle_rate: self.hurdle_rate,
            lp_split: self.lp_split,
            gp_split: self.gp_split,
        })
    }
}

/// Load a deal from a JSON file
pub fn load_deal<P: AsRef<Path>>(path: P) -> ProformaResult<DealAssumptions> {
    let file = File::open(path.as_ref())?;
    load_deal_from_reader(BufReader::new(file))
}

/// Load a deal from any reader (e.g., string buffer, request body)
pub fn load_deal_from_reader<R: Read>(reader: R) -> ProformaResult<DealAssumptions> {
    let deal: DealAssumptions = serde_json::from_reader(reader)?;
    deal.validate()?;
    Ok(deal)
}

/// Load a waterfall schedule from CSV (`order,name,hurdle_rate,lp_split,gp_split`)
pub fn load_waterfall_tiers<P: AsRef<Path>>(path: P) -> ProformaResult<Vec<WaterfallTier>> {
    let file = File::open(path.as_ref())?;
    load_waterfall_tiers_from_reader(file)
}

pub fn load_waterfall_tiers_from_reader<R: Read>(reader: R) -> ProformaResult<Vec<WaterfallTier>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut tiers = Vec::new();

    for result in csv_reader.deserialize() {
        let row: TierRow = result?;
        tiers.push(row.into_tier()?);
    }

    Ok(tiers)
}

/// Load every `*.json` deal in a directory, sorted by file name.
///
/// Only a failure to read the directory itself is an error; each file carries
/// its own load result so one bad deal does not hide the others.
pub fn load_deals_from_dir<P: AsRef<Path>>(dir: P) -> ProformaResult<Vec<(PathBuf, ProformaResult<DealAssumptions>)>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| {
            let deal = load_deal(&path);
            if let Err(e) = &deal {
                log::warn!("Skipping {}: {}", path.display(), e);
            }
            (path, deal)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::PropertyType;

    #[test]
    fn test_load_deal_from_json() {
        let json = r#"{
            "dealName": "Maple Court",
            "propertyType": "hotel",
            "acquisitionDate": "2025-03-31",
            "purchasePrice": 10000000,
            "totalEquityRaise": 3500000,
            "loanAmount": 7000000,
            "interestRate": 0.065,
            "loanTermYears": 10,
            "holdPeriodYears": 7,
            "waterfallTiers": [
                {"order": 1, "name": "Preferred Return", "hurdleRate": 0.08, "lpSplit": 1.0, "gpSplit": 0.0},
                {"order": 2, "name": "Profit Split", "lpSplit": 0.7, "gpSplit": 0.3}
            ]
        }"#;

        let deal = load_deal_from_reader(json.as_bytes()).unwrap();
        assert_eq!(deal.deal_name, "Maple Court");
        assert_eq!(deal.property_type, PropertyType::Hotel);
        assert_eq!(deal.hold_period_years, 7);
        assert_eq!(deal.waterfall_tiers.len(), 2);
        assert!(deal.waterfall_tiers[1].is_residual());
        // Omitted fields take defaults
        assert_eq!(deal.renovation_budget, 0.0);
        assert!(!deal.interest_only);
    }

    #[test]
    fn test_load_deal_rejects_zero_hold() {
        let json = r#"{"purchasePrice": 1000000, "holdPeriodYears": 0}"#;
        let result = load_deal_from_reader(json.as_bytes());
        assert!(matches!(result, Err(ProformaError::InvalidInput { .. })));
    }

    #[test]
    fn test_load_deal_reports_malformed_json() {
        let result = load_deal_from_reader("{not json".as_bytes());
        assert!(matches!(result, Err(ProformaError::Json(_))));
    }

    #[test]
    fn test_load_tiers_from_csv() {
        let csv = "order,name,hurdle_rate,lp_split,gp_split\n\
                   1,Preferred Return,0.08,1.0,0.0\n\
                   2,First Promote,0.12,0.8,0.2\n\
                   3,Residual,,0.6,0.4\n";

        let tiers = load_waterfall_tiers_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].hurdle_rate, Some(0.08));
        assert_eq!(tiers[1].lp_split, 0.8);
        assert!(tiers[2].is_residual());
    }

    #[test]
    fn test_load_tiers_rejects_blank_name() {
        let csv = "order,name,hurdle_rate,lp_split,gp_split\n1, ,0.08,1.0,0.0\n";
        assert!(load_waterfall_tiers_from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_load_deals_from_dir() {
        let deals = load_deals_from_dir("data/deals").unwrap();
        let loaded: Vec<&DealAssumptions> = deals.iter().filter_map(|(_, deal)| deal.as_ref().ok()).collect();
        let names: Vec<&str> = loaded.iter().map(|deal| deal.deal_name.as_str()).collect();
        assert_eq!(names, vec!["Harbor Logistics Center", "Maple Court Apartments"]);

        let harbor = loaded[0];
        assert_eq!(harbor.property_type, PropertyType::Industrial);
        assert_eq!(harbor.renovation_budget, 0.0);
        assert!(harbor.waterfall_tiers.is_empty());
        assert_eq!(loaded[1].waterfall_tiers.len(), 3);
    }

    #[test]
    fn test_bad_file_does_not_hide_good_deals() {
        let dir = std::env::temp_dir().join(format!("proforma_mixed_deals_{}", std::process::id()));
        if dir.exists() {
            std::fs::remove_dir_all(&dir).ok();
        }
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::copy("data/deals/maple_court.json", dir.join("a_good.json")).unwrap();
        std::fs::write(dir.join("b_bad.json"), r#"{"holdPeriodYears": 0}"#).unwrap();
        std::fs::write(dir.join("c_broken.json"), "{ not json").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let deals = load_deals_from_dir(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(deals.len(), 3);
        assert_eq!(deals[0].1.as_ref().unwrap().deal_name, "Maple Court Apartments");
        assert!(matches!(deals[1].1, Err(ProformaError::InvalidInput { .. })));
        assert!(matches!(deals[2].1, Err(ProformaError::Json(_))));
    }
}
