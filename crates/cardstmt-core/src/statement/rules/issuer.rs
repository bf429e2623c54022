//! Card issuer identification by keyword.

use crate::models::statement::Issuer;

/// Ordered keyword rules; the first rule with any keyword present wins.
const ISSUER_RULES: &[(&[&str], Issuer)] = &[
    (&["chase", "sapphire"], Issuer::Chase),
    (&["american express", "amex"], Issuer::AmericanExpress),
    (&["citi"], Issuer::Citi),
    (&["bank of america", "boa"], Issuer::BankOfAmerica),
    (&["capital one"], Issuer::CapitalOne),
    (&["discover card", "discover it"], Issuer::Discover),
    (&["wells fargo"], Issuer::WellsFargo),
];

/// Identify the issuer from the full statement text.
///
/// Case-insensitive substring match against [`ISSUER_RULES`] in order;
/// returns [`Issuer::Unknown`] when nothing matches.
pub fn identify_issuer(text: &str) -> Issuer {
    let text_lower = text.to_lowercase();

    ISSUER_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text_lower.contains(k)))
        .map(|(_, issuer)| *issuer)
        .unwrap_or(Issuer::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_issuer() {
        assert_eq!(identify_issuer("CHASE SAPPHIRE PREFERRED"), Issuer::Chase);
        assert_eq!(identify_issuer("Your AmEx Gold Card"), Issuer::AmericanExpress);
        assert_eq!(identify_issuer("Citi Double Cash"), Issuer::Citi);
        assert_eq!(identify_issuer("Bank of America Customized Cash"), Issuer::BankOfAmerica);
        assert_eq!(identify_issuer("Capital One Quicksilver"), Issuer::CapitalOne);
        assert_eq!(identify_issuer("Discover it Cash Back"), Issuer::Discover);
        assert_eq!(identify_issuer("Wells Fargo Active Cash"), Issuer::WellsFargo);
    }

    #[test]
    fn test_unknown_issuer() {
        assert_eq!(identify_issuer("Acme Credit Union statement"), Issuer::Unknown);
        assert_eq!(identify_issuer(""), Issuer::Unknown);
    }

    #[test]
    fn test_declared_order_wins() {
        // Citi appears first in the text, Chase is declared first.
        let text = "Citi transfer to Chase account";
        for _ in 0..3 {
            assert_eq!(identify_issuer(text), Issuer::Chase);
        }
        assert_eq!(identify_issuer("american express via citi"), Issuer::AmericanExpress);
    }
}
