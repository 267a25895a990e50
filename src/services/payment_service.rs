// src/services/payment_service.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    models::company::{
        Company, ModuleSetPatch, PaymentRecord, PaymentStatus, PlanTier,
    },
    services::{duitnow, subscription},
};

/// Preço mensal base de cada plano, em MYR.
pub fn plan_price(plan: PlanTier) -> Decimal {
    match plan {
        PlanTier::Basic => Decimal::new(9999, 2),
        PlanTier::Standard => Decimal::new(19999, 2),
        PlanTier::Premium => Decimal::new(29999, 2),
        PlanTier::Enterprise => Decimal::new(49999, 2),
    }
}

/// Valor devido: plano + módulos adicionais pedidos na intenção (apenas
/// chaves explicitamente marcadas como true contam como add-on).
pub fn amount_due(plan: PlanTier, modules: &ModuleSetPatch) -> Decimal {
    let mut amount = plan_price(plan);

    let addons: [(Option<bool>, Decimal); 8] = [
        (modules.pos, Decimal::new(2999, 2)),
        (modules.inventory, Decimal::new(2999, 2)),
        (modules.laundry, Decimal::new(3999, 2)),
        (modules.services, Decimal::new(2999, 2)),
        (modules.coupons, Decimal::new(1999, 2)),
        (modules.wallet, Decimal::new(2499, 2)),
        (modules.reports, Decimal::new(1999, 2)),
        (modules.viewer_access, Decimal::new(1499, 2)),
    ];

    for (selected, price) in addons {
        if selected == Some(true) {
            amount += price;
        }
    }

    amount
}

/// O gateway reporta sucesso como SUCCESS ou COMPLETED (qualquer caixa).
pub fn is_success_status(status: &str) -> bool {
    matches!(status.to_uppercase().as_str(), "SUCCESS" | "COMPLETED")
}

/// Validade da intenção de pagamento (o QR expira em 24h).
pub const INTENT_EXPIRY_HOURS: i64 = 24;

// Intenção de pagamento gerada, pronta para virar resposta HTTP.
#[derive(Debug)]
pub struct PaymentIntent {
    pub company: Company,
    pub qr_code: String,
    pub reference: String,
    pub amount: Decimal,
    pub expires_at: DateTime<Utc>,
}

// Resultado do callback do gateway.
#[derive(Debug)]
pub struct CallbackOutcome {
    pub company: Company,
    // true quando este callback causou a ativação; false em replay ou
    // em status não-sucesso.
    pub activated: bool,
}

#[derive(Clone)]
pub struct PaymentService {
    company_repo: CompanyRepository,
}

impl PaymentService {
    pub fn new(company_repo: CompanyRepository) -> Self {
        Self { company_repo }
    }

    /// Gera a intenção de pagamento DuitNow da empresa: calcula o valor,
    /// grava a referência + plano/módulos escolhidos no registro de
    /// pagamento e devolve o QR. A assinatura não muda aqui.
    pub async fn generate_intent(
        &self,
        company: &Company,
        plan: PlanTier,
        modules: ModuleSetPatch,
    ) -> Result<PaymentIntent, AppError> {
        let now = Utc::now();
        let amount = amount_due(plan, &modules);
        let reference = duitnow::generate_reference(company.id, now);
        let payload = duitnow::build_payload(&reference, amount);
        let qr_code = duitnow::qr_png_data_url(&payload)?;

        let selected_modules = company.subscription.modules.merged(&modules);

        let payment = PaymentRecord {
            reference: Some(reference.clone()),
            transaction_id: None,
            amount: Some(amount),
            status: PaymentStatus::Pending,
            method: Some("DuitNow".to_string()),
            plan: Some(plan),
            modules: Some(selected_modules),
            generated_at: Some(now),
            paid_at: None,
        };

        let company = self
            .company_repo
            .set_payment_details(company.id, &payment)
            .await?;

        Ok(PaymentIntent {
            company,
            qr_code,
            reference,
            amount,
            expires_at: now + Duration::hours(INTENT_EXPIRY_HOURS),
        })
    }

    /// Consome um callback do gateway. Endpoint público: o gateway não
    /// assina o callback, então qualquer chamador que conheça um
    /// referenceNo válido consegue ativar a assinatura correspondente.
    /// Limitação conhecida da integração atual.
    pub async fn handle_callback(
        &self,
        transaction_id: &str,
        amount: Decimal,
        status: &str,
        reference_no: &str,
    ) -> Result<CallbackOutcome, AppError> {
        // Referência desconhecida: rejeita sem tocar em estado algum.
        let company = self
            .company_repo
            .find_by_payment_reference(reference_no)
            .await?
            .ok_or(AppError::UnmatchedPaymentReference)?;

        if !is_success_status(status) {
            // Falha/pendência do gateway: só o registro de pagamento
            // espelha o status (minúsculas); a assinatura não transiciona.
            let payment = PaymentRecord {
                status: PaymentStatus::from(status.to_string()),
                ..company.payment_details.0.clone()
            };
            let company = self
                .company_repo
                .set_payment_details(company.id, &payment)
                .await?;

            tracing::info!(
                "💳 Callback não-sucesso ({}) espelhado para a empresa {}.",
                status,
                company.id
            );
            return Ok(CallbackOutcome {
                company,
                activated: false,
            });
        }

        let Some((new_subscription, new_payment)) = subscription::apply_gateway_success(
            &company.subscription,
            &company.payment_details,
            transaction_id,
            Some(amount),
            Utc::now(),
        ) else {
            // Pagamento já concluído: replay é no-op, só reconfirma.
            tracing::info!(
                "🔁 Callback repetido para a empresa {}; estado mantido.",
                company.id
            );
            return Ok(CallbackOutcome {
                company,
                activated: false,
            });
        };

        match self
            .company_repo
            .complete_pending_payment(company.id, &new_subscription, &new_payment)
            .await?
        {
            Some(updated) => {
                tracing::info!(
                    "✅ Pagamento confirmado; empresa {} ativada até {:?}.",
                    updated.name,
                    updated.subscription.end_date
                );
                Ok(CallbackOutcome {
                    company: updated,
                    activated: true,
                })
            }
            None => {
                // Um callback concorrente concluiu primeiro; devolve o
                // estado vigente sem reescrever nada.
                let current = self
                    .company_repo
                    .find_by_id(company.id)
                    .await?
                    .ok_or(AppError::CompanyNotFound)?;
                Ok(CallbackOutcome {
                    company: current,
                    activated: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preco_do_plano_segue_a_tabela() {
        assert_eq!(plan_price(PlanTier::Basic), Decimal::new(9999, 2));
        assert_eq!(plan_price(PlanTier::Enterprise), Decimal::new(49999, 2));
    }

    #[test]
    fn valor_devido_soma_apenas_addons_pedidos() {
        let patch = ModuleSetPatch {
            pos: Some(true),
            laundry: Some(true),
            inventory: Some(false), // pedido explícito de "não" não soma
            ..ModuleSetPatch::default()
        };

        // 99.99 + 29.99 (pos) + 39.99 (laundry)
        assert_eq!(
            amount_due(PlanTier::Basic, &patch),
            Decimal::new(16997, 2)
        );

        // Sem add-ons, só o plano.
        assert_eq!(
            amount_due(PlanTier::Standard, &ModuleSetPatch::default()),
            Decimal::new(19999, 2)
        );
    }

    #[test]
    fn reconhece_status_de_sucesso_do_gateway() {
        assert!(is_success_status("SUCCESS"));
        assert!(is_success_status("completed"));
        assert!(is_success_status("Completed"));
        assert!(!is_success_status("FAILED"));
        assert!(!is_success_status("PENDING"));
    }
}
