// src/services/subscription.rs

// O ciclo de vida da assinatura (pending -> active -> suspended) como
// transições puras: cada função recebe o estado atual e devolve o estado
// seguinte completo. Quem persiste é o repositório, sempre em um único
// UPDATE, com is_active derivado de `is_company_active()`.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::company::{
    ModuleSet, PaymentRecord, PaymentStatus, PlanTier, Subscription, SubscriptionStatus,
};

/// Janela concedida por um pagamento confirmado pelo gateway: 1 ano.
pub const PAYMENT_TERM_DAYS: i64 = 365;

/// Janela concedida pela ativação manual de um admin da plataforma: 30
/// dias. O prazo curto é intencional e diferente do prazo pago.
pub const ADMIN_ACTIVATION_DAYS: i64 = 30;

impl Subscription {
    /// Estado de nascimento de toda empresa: pendente, sem janela de
    /// validade, módulos pagos desligados; relatórios e acesso de
    /// visualização vêm ligados por padrão.
    pub fn initial(plan: PlanTier) -> Subscription {
        Subscription {
            plan,
            status: SubscriptionStatus::Pending,
            modules: ModuleSet {
                reports: true,
                viewer_access: true,
                ..ModuleSet::default()
            },
            start_date: None,
            end_date: None,
        }
    }

    /// Transição de sucesso de pagamento: ativa com janela de 1 ano e
    /// substitui os módulos pelos contratados na intenção de pagamento.
    pub fn activate_from_payment(
        &self,
        plan: PlanTier,
        modules: ModuleSet,
        now: DateTime<Utc>,
    ) -> Subscription {
        Subscription {
            plan,
            status: SubscriptionStatus::Active,
            modules,
            start_date: Some(now),
            end_date: Some(now + Duration::days(PAYMENT_TERM_DAYS)),
        }
    }

    /// Ativação manual por um admin da plataforma (sem pagamento).
    pub fn activate_by_admin(&self, now: DateTime<Utc>) -> Subscription {
        Subscription {
            status: SubscriptionStatus::Active,
            start_date: Some(now),
            end_date: Some(now + Duration::days(ADMIN_ACTIVATION_DAYS)),
            ..self.clone()
        }
    }

    /// Suspensão administrativa. Os módulos contratados e a janela NÃO
    /// são limpos: a configuração fica guardada para uma reativação.
    pub fn suspend(&self) -> Subscription {
        Subscription {
            status: SubscriptionStatus::Suspended,
            ..self.clone()
        }
    }

    /// Edição administrativa de plano/módulos, sem mudança de status.
    pub fn with_plan_and_modules(
        &self,
        plan: Option<PlanTier>,
        modules: Option<ModuleSet>,
    ) -> Subscription {
        Subscription {
            plan: plan.unwrap_or(self.plan),
            modules: modules.unwrap_or(self.modules),
            ..self.clone()
        }
    }

    /// Única fonte da flag de ativação da empresa.
    pub fn is_company_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// Resultado de um callback de sucesso do gateway. Retorna `None` quando
/// o pagamento da empresa já está concluído: reaplicar o mesmo callback
/// não estende a janela nem duplica efeito algum.
pub fn apply_gateway_success(
    subscription: &Subscription,
    payment: &PaymentRecord,
    transaction_id: &str,
    amount: Option<Decimal>,
    now: DateTime<Utc>,
) -> Option<(Subscription, PaymentRecord)> {
    if payment.status.is_completed() {
        return None;
    }

    // O plano/módulos contratados ficaram gravados na intenção de
    // pagamento; na falta deles (intenção nunca gerada), mantém o atual.
    let plan = payment.plan.unwrap_or(subscription.plan);
    let modules = payment.modules.unwrap_or(subscription.modules);

    let new_subscription = subscription.activate_from_payment(plan, modules, now);
    let new_payment = PaymentRecord {
        transaction_id: Some(transaction_id.to_string()),
        status: PaymentStatus::Completed,
        method: Some("DuitNow".to_string()),
        amount: amount.or(payment.amount),
        paid_at: Some(now),
        ..payment.clone()
    };

    Some((new_subscription, new_payment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agora() -> DateTime<Utc> {
        "2025-08-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn empresa_nasce_pendente_com_modulos_padrao() {
        let sub = Subscription::initial(PlanTier::Basic);
        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert!(!sub.is_company_active());
        assert!(sub.modules.reports);
        assert!(sub.modules.viewer_access);
        assert!(!sub.modules.pos);
        assert!(!sub.modules.inventory);
        assert!(sub.start_date.is_none());
        assert!(sub.end_date.is_none());
    }

    #[test]
    fn pagamento_ativa_com_janela_de_um_ano() {
        let now = agora();
        let modules = ModuleSet {
            pos: true,
            reports: true,
            viewer_access: true,
            ..ModuleSet::default()
        };
        let sub = Subscription::initial(PlanTier::Basic)
            .activate_from_payment(PlanTier::Standard, modules, now);

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.is_company_active());
        assert_eq!(sub.plan, PlanTier::Standard);
        assert!(sub.modules.pos);
        assert_eq!(sub.start_date, Some(now));
        assert_eq!(sub.end_date, Some(now + Duration::days(365)));
    }

    #[test]
    fn ativacao_manual_tem_janela_curta_de_30_dias() {
        let now = agora();
        let sub = Subscription::initial(PlanTier::Premium).activate_by_admin(now);

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.plan, PlanTier::Premium);
        assert_eq!(sub.end_date, Some(now + Duration::days(30)));
    }

    #[test]
    fn suspensao_preserva_modulos_e_janela() {
        // Comportamento documentado: suspender não limpa os módulos
        // contratados nem a janela; só o status (e a flag) mudam.
        let now = agora();
        let ativa = Subscription::initial(PlanTier::Standard).activate_from_payment(
            PlanTier::Standard,
            ModuleSet {
                pos: true,
                laundry: true,
                ..ModuleSet::default()
            },
            now,
        );

        let suspensa = ativa.suspend();
        assert_eq!(suspensa.status, SubscriptionStatus::Suspended);
        assert!(!suspensa.is_company_active());
        assert!(suspensa.modules.pos);
        assert!(suspensa.modules.laundry);
        assert_eq!(suspensa.end_date, ativa.end_date);
    }

    #[test]
    fn flag_e_status_concordam_em_todo_caminho() {
        let now = agora();
        let pendente = Subscription::initial(PlanTier::Basic);
        let ativa = pendente.activate_from_payment(PlanTier::Basic, pendente.modules, now);
        let suspensa = ativa.suspend();
        let reativada = suspensa.activate_by_admin(now);

        for sub in [&pendente, &ativa, &suspensa, &reativada] {
            assert_eq!(
                sub.is_company_active(),
                sub.status == SubscriptionStatus::Active
            );
        }
    }

    #[test]
    fn callback_de_sucesso_repetido_e_noop() {
        let now = agora();
        let sub = Subscription::initial(PlanTier::Basic);
        let payment = PaymentRecord {
            reference: Some("VENTUREE_BIZ_1_abc".to_string()),
            amount: Some(Decimal::new(9999, 2)),
            plan: Some(PlanTier::Basic),
            modules: Some(sub.modules),
            generated_at: Some(now),
            ..PaymentRecord::default()
        };

        let (sub2, pay2) =
            apply_gateway_success(&sub, &payment, "tx1", Some(Decimal::new(9999, 2)), now)
                .expect("primeiro callback transiciona");

        assert_eq!(sub2.status, SubscriptionStatus::Active);
        assert_eq!(pay2.status, PaymentStatus::Completed);
        assert_eq!(pay2.transaction_id.as_deref(), Some("tx1"));

        // Reaplicar o mesmo callback sobre o estado resultante: no-op.
        let replay = apply_gateway_success(
            &sub2,
            &pay2,
            "tx1",
            Some(Decimal::new(9999, 2)),
            now + Duration::hours(1),
        );
        assert!(replay.is_none());
    }
}
