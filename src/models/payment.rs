use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Dinheiro,
    Pix,
    CartaoCredito,
    CartaoDebito,
    Voucher,
    Misto,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Dinheiro,
        PaymentMethod::Pix,
        PaymentMethod::CartaoCredito,
        PaymentMethod::CartaoDebito,
        PaymentMethod::Voucher,
        PaymentMethod::Misto,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "dinheiro",
            PaymentMethod::Pix => "pix",
            PaymentMethod::CartaoCredito => "cartao_credito",
            PaymentMethod::CartaoDebito => "cartao_debito",
            PaymentMethod::Voucher => "voucher",
            PaymentMethod::Misto => "misto",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "Dinheiro",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CartaoCredito => "Cartão de Crédito",
            PaymentMethod::CartaoDebito => "Cartão de Débito",
            PaymentMethod::Voucher => "Voucher",
            PaymentMethod::Misto => "Pagamento Misto",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    /// Only cash payments ask for change.
    pub fn takes_change(self) -> bool {
        matches!(self, PaymentMethod::Dinheiro)
    }
}

/// Display name for a payment code; unknown codes pass through verbatim.
pub fn payment_method_label(code: &str) -> &str {
    match PaymentMethod::from_code(code) {
        Some(method) => method.label(),
        None => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_to_labels() {
        assert_eq!(payment_method_label("dinheiro"), "Dinheiro");
        assert_eq!(payment_method_label("cartao_credito"), "Cartão de Crédito");
        assert_eq!(payment_method_label("misto"), "Pagamento Misto");
    }

    #[test]
    fn test_unknown_code_passes_through() {
        assert_eq!(payment_method_label("ifood"), "ifood");
        assert_eq!(payment_method_label(""), "");
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&PaymentMethod::CartaoDebito).unwrap();
        assert_eq!(json, "\"cartao_debito\"");
    }
}
