// src/services/duitnow.rs

// Geração da referência e do QR Code DuitNow. O payload segue o formato
// EMV simplificado que a plataforma sempre usou; a especificação oficial
// do DuitNow exige campos adicionais e CRC real.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;

/// Referência única de transação gravada na intenção de pagamento e
/// devolvida pelo gateway no callback.
pub fn generate_reference(company_id: Uuid, now: DateTime<Utc>) -> String {
    format!("VENTUREE_BIZ_{}_{}", now.timestamp_millis(), company_id)
}

/// Monta a string EMV do QR (valor com duas casas decimais, moeda MYR).
pub fn build_payload(reference: &str, amount: Decimal) -> String {
    format!(
        "00020101021226610014A00000061700010801{reference}0208{amount:.2}53034585802MY5920VENTUREE BIZ PLATFORM6008KUALA LUMPUR62220716{reference}6304",
    )
}

/// Renderiza o payload como PNG e devolve uma data URL base64, pronta
/// para o frontend exibir.
pub fn qr_png_data_url(payload: &str) -> Result<String, AppError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

    let mut png = Vec::new();
    dynamic_image
        .write_to(&mut png, image::ImageOutputFormat::Png)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referencia_carrega_prefixo_e_empresa() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let reference = generate_reference(id, now);

        assert!(reference.starts_with("VENTUREE_BIZ_"));
        assert!(reference.ends_with(&id.to_string()));
    }

    #[test]
    fn payload_emv_inclui_valor_moeda_e_referencia() {
        let payload = build_payload("VENTUREE_BIZ_1_x", Decimal::new(12990, 2));

        assert!(payload.starts_with("000201"));
        assert!(payload.contains("129.90"));
        assert!(payload.contains("5802MY"));
        // A referência aparece duas vezes (merchant account e campo 62).
        assert_eq!(payload.matches("VENTUREE_BIZ_1_x").count(), 2);
    }

    #[test]
    fn qr_vira_data_url_png() {
        let payload = build_payload("VENTUREE_BIZ_1_x", Decimal::new(9999, 2));
        let data_url = qr_png_data_url(&payload).unwrap();
        assert!(data_url.starts_with("data:image/png;base64,"));
    }
}
