// src/services/access.rs

// As regras de autorização do sistema, como funções puras de argumentos
// explícitos (quem pede, de qual empresa, sobre qual empresa). Nada aqui
// lê estado de requisição ou banco; os handlers compõem as verificações
// com `?` e a primeira falha interrompe a cadeia.

use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    CrossCompanyAccess,
    InsufficientRole,
    SelfDeleteForbidden,
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::CrossCompanyAccess => AppError::CrossCompanyAccess,
            AccessDenied::InsufficientRole => AppError::InsufficientRole,
            AccessDenied::SelfDeleteForbidden => AppError::SelfDeleteForbidden,
        }
    }
}

/// Verificação de isolamento entre empresas. Regras em ordem; a primeira
/// que casa decide:
/// 1. admin da plataforma passa sempre (não tem escopo de empresa);
/// 2. operação sem empresa-alvo é auto-escopada, passa;
/// 3. empresa-alvo igual à do solicitante passa;
/// 4. qualquer outro caso é acesso cruzado.
pub fn check_company_access(
    role: Role,
    requester_company: Option<Uuid>,
    target_company: Option<Uuid>,
) -> Result<(), AccessDenied> {
    if role == Role::Admin {
        return Ok(());
    }

    match target_company {
        None => Ok(()),
        Some(target) if requester_company == Some(target) => Ok(()),
        Some(_) => Err(AccessDenied::CrossCompanyAccess),
    }
}

/// Operações restritas por papel: o solicitante precisa pertencer ao
/// conjunto exigido pela operação.
pub fn check_role(role: Role, allowed: &[Role]) -> Result<(), AccessDenied> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AccessDenied::InsufficientRole)
    }
}

/// Regra de negócio fixa: ninguém remove a própria conta, mesmo tendo
/// papel suficiente para remover as dos outros.
pub fn check_not_self_delete(
    requester_id: Uuid,
    target_user_id: Uuid,
) -> Result<(), AccessDenied> {
    if requester_id == target_user_id {
        Err(AccessDenied::SelfDeleteForbidden)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolamento_entre_empresas() {
        let minha = Uuid::new_v4();
        let outra = Uuid::new_v4();

        // Nenhum papel comum atravessa para outra empresa.
        for role in [Role::CompanyAdmin, Role::Staff, Role::Viewer] {
            assert_eq!(
                check_company_access(role, Some(minha), Some(outra)),
                Err(AccessDenied::CrossCompanyAccess)
            );
        }
    }

    #[test]
    fn admin_da_plataforma_passa_sempre() {
        let outra = Uuid::new_v4();
        assert!(check_company_access(Role::Admin, None, Some(outra)).is_ok());
        assert!(check_company_access(Role::Admin, None, None).is_ok());
    }

    #[test]
    fn operacao_auto_escopada_e_empresa_propria_passam() {
        let minha = Uuid::new_v4();
        assert!(check_company_access(Role::Staff, Some(minha), None).is_ok());
        assert!(check_company_access(Role::Staff, Some(minha), Some(minha)).is_ok());
    }

    #[test]
    fn papel_insuficiente_e_negado() {
        let gate = [Role::Admin, Role::CompanyAdmin];
        assert!(check_role(Role::CompanyAdmin, &gate).is_ok());
        assert_eq!(
            check_role(Role::Staff, &gate),
            Err(AccessDenied::InsufficientRole)
        );
        assert_eq!(
            check_role(Role::Viewer, &gate),
            Err(AccessDenied::InsufficientRole)
        );
    }

    #[test]
    fn remover_a_propria_conta_e_negado() {
        let eu = Uuid::new_v4();
        let outro = Uuid::new_v4();
        assert_eq!(
            check_not_self_delete(eu, eu),
            Err(AccessDenied::SelfDeleteForbidden)
        );
        assert!(check_not_self_delete(eu, outro).is_ok());
    }
}
