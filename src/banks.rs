//! Venezuelan bank directory.
//!
//! Transfer searches identify the issuing bank by its numeric code (the
//! leading four digits of a Venezuelan account number). The default issuer
//! is Banco Mercantil, `0105`.

/// A bank participating in the national payment system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bank {
    /// Four-digit bank code, zero padded.
    pub code: &'static str,
    /// Commercial name.
    pub name: &'static str,
}

impl Bank {
    /// Returns the code as the integer sent in `issuerBankId`.
    pub fn id(&self) -> u16 {
        self.code
            .bytes()
            .fold(0u16, |acc, b| acc * 10 + (b - b'0') as u16)
    }
}

/// Issuer used by transfer searches when none is chosen.
pub const DEFAULT_ISSUER_BANK_ID: u16 = 105;

/// All banks known to the search forms, ordered by code.
pub const BANKS: &[Bank] = &[
    Bank { code: "0102", name: "Banco de Venezuela" },
    Bank { code: "0104", name: "Venezolano de Crédito" },
    Bank { code: "0105", name: "Banco Mercantil" },
    Bank { code: "0108", name: "Banco Provincial" },
    Bank { code: "0114", name: "Bancaribe" },
    Bank { code: "0115", name: "Banco Exterior" },
    Bank { code: "0116", name: "Banco Occidental de Descuento" },
    Bank { code: "0128", name: "Banco Caroní" },
    Bank { code: "0134", name: "Banesco" },
    Bank { code: "0137", name: "Banco Sofitasa" },
    Bank { code: "0138", name: "Banco Plaza" },
    Bank { code: "0146", name: "Banco de la Gente Emprendedora" },
    Bank { code: "0149", name: "Banco del Pueblo Soberano" },
    Bank { code: "0151", name: "BFC Banco Fondo Común" },
    Bank { code: "0156", name: "100% Banco" },
    Bank { code: "0157", name: "DelSur" },
    Bank { code: "0163", name: "Banco del Tesoro" },
    Bank { code: "0166", name: "Banco Agrícola de Venezuela" },
    Bank { code: "0168", name: "Bancrecer" },
    Bank { code: "0169", name: "Mi Banco" },
    Bank { code: "0171", name: "Banco Activo" },
    Bank { code: "0172", name: "Bancamiga" },
    Bank { code: "0173", name: "Banco Internacional de Desarrollo" },
    Bank { code: "0174", name: "Banplus" },
    Bank { code: "0175", name: "Banco Bicentenario" },
    Bank { code: "0177", name: "Banco de la Fuerza Armada Nacional Bolivariana" },
    Bank { code: "0191", name: "Banco Nacional de Crédito" },
];

/// Looks up a bank by its four-digit code.
///
/// # Example
///
/// ```
/// use payframe::banks;
///
/// assert_eq!(banks::lookup("0105").map(|b| b.name), Some("Banco Mercantil"));
/// assert!(banks::lookup("9999").is_none());
/// ```
pub fn lookup(code: &str) -> Option<&'static Bank> {
    BANKS.iter().find(|b| b.code == code)
}

/// Looks up a bank by its numeric id (`105` for `0105`).
pub fn by_id(id: u16) -> Option<&'static Bank> {
    BANKS.iter().find(|b| b.id() == id)
}

/// Infers the bank from the first four digits of an account number.
pub fn from_account(account: &str) -> Option<&'static Bank> {
    let digits: String = account
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(4)
        .collect();
    lookup(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_sorted() {
        for pair in BANKS.windows(2) {
            assert!(pair[0].code < pair[1].code, "{} >= {}", pair[0].code, pair[1].code);
        }
        assert!(BANKS.iter().all(|b| b.code.len() == 4));
    }

    #[test]
    fn test_default_issuer_is_mercantil() {
        assert_eq!(by_id(DEFAULT_ISSUER_BANK_ID).map(|b| b.code), Some("0105"));
    }

    #[test]
    fn test_id() {
        assert_eq!(lookup("0191").map(Bank::id), Some(191));
        assert!(by_id(1).is_none());
    }

    #[test]
    fn test_from_account() {
        let bank = from_account("0105 0054 1510 5454 0721").unwrap();
        assert_eq!(bank.name, "Banco Mercantil");
        assert!(from_account("01").is_none());
    }
}
