//! Canned user-facing message templates (Portuguese).
//!
//! Every user-visible outcome — success, validation failure, not-found,
//! permission denial, upstream failure — maps to one of these fixed
//! texts. Tools return them verbatim and the agent is instructed not to
//! rewrite them. Bold uses the single-asterisk WhatsApp convention.

use crate::category::{Category, ALL_CATEGORIES};
use crate::model::{Expense, Goal};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Render a 10-slot progress bar for `actual / total`.
fn progress_bar(actual: Decimal, total: Decimal) -> (String, f64) {
    let pct = if total.is_zero() {
        0.0
    } else {
        (actual / total).to_f64().unwrap_or(0.0) * 100.0
    };
    let filled = ((pct / 10.0) as usize).min(10);
    let bar = "█".repeat(filled) + &"░".repeat(10 - filled);
    (bar, pct)
}

fn brl(value: Decimal) -> String {
    format!("R$ {:.2}", value)
}

/// Expense (gasto) messages.
pub mod gastos {
    use super::*;

    pub fn create_success(
        descricao: &str,
        categoria: Category,
        valor: Decimal,
        data: DateTime<Utc>,
        id: Uuid,
    ) -> String {
        format!(
            "✅ *GASTO REGISTRADO COM SUCESSO!*\n\n\
             📝 \"{descricao}\"  \"{categoria}\"\n\n\
             💵 Valor: {}\n\n\
             📅 Data: {}\n\n\
             ⚙️ `{id}`",
            brl(valor),
            data.format("%d/%m/%Y"),
        )
    }

    pub fn consult_success(expense: &Expense, categoria: &str) -> String {
        format!(
            "🔍 *DETALHES DO GASTO*\n\n\
             📝 {}\n\
             💵 {}\n\
             📅 {}\n\
             🏷️ {categoria}\n\n\
             ⚙️ `{}`",
            expense.message,
            brl(expense.value),
            expense.created_at.format("%d/%m/%Y"),
            expense.id,
        )
    }

    /// Per-category totals table shared by the summary variants.
    fn category_table(por_categoria: &HashMap<Category, Decimal>) -> String {
        ALL_CATEGORIES
            .iter()
            .map(|cat| {
                let total = por_categoria.get(cat).copied().unwrap_or(Decimal::ZERO);
                format!("{} {}: {}", cat.emoji(), cat.label(), brl(total))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn consult_all_success(total: Decimal, por_categoria: &HashMap<Category, Decimal>) -> String {
        format!(
            "📊 *RESUMO DOS SEUS GASTOS*\n\n\
             💵 Total: {}\n\n\
             *Gasto por categoria:*\n\n{}",
            brl(total),
            category_table(por_categoria),
        )
    }

    pub fn consult_period_success(
        periodo: &str,
        total: Decimal,
        por_categoria: &HashMap<Category, Decimal>,
    ) -> String {
        format!(
            "📊 *RESUMO DOS SEUS GASTOS - {}*\n\n\
             💵 Total: {}\n\n\
             *Gasto por categoria:*\n\n{}",
            periodo.to_uppercase(),
            brl(total),
            category_table(por_categoria),
        )
    }

    pub fn recent_list(gastos: &[Expense]) -> String {
        let linhas: Vec<String> = gastos
            .iter()
            .map(|g| {
                let cat = g
                    .categoria_name
                    .as_deref()
                    .and_then(Category::from_name)
                    .unwrap_or(Category::Outros);
                format!(
                    "{}  📅 {}\n{} - {}\n⚙️ `{}`",
                    cat.emoji(),
                    g.created_at.format("%d/%m/%Y"),
                    brl(g.value),
                    g.message,
                    g.id,
                )
            })
            .collect();
        format!(
            "📊 *Seus últimos {} gastos:*\n\n{}",
            linhas.len(),
            linhas.join("\n\n"),
        )
    }

    pub fn last_deleted(gasto: &Expense) -> String {
        let categoria = gasto.categoria_name.as_deref().unwrap_or("outros");
        format!(
            "✅ Último gasto deletado com sucesso!\n\n\
             🗑️ Gasto removido:\n\
             • {}\n\
             • {}\n\
             • Categoria: {categoria}\n\
             • Data: {}\n\n\
             ⚙️ `{}`",
            gasto.message,
            brl(gasto.value),
            gasto.created_at.format("%d/%m/%Y às %H:%M"),
            gasto.id,
        )
    }

    pub fn category_total(categoria: Category, total: Decimal) -> String {
        format!("📊 Total em {categoria} este mês: {}", brl(total))
    }

    pub fn category_empty(categoria: Category) -> String {
        format!("📊 Nenhum gasto em {categoria} este mês")
    }

    pub fn edit_success() -> String {
        "🆙 Gasto atualizado com sucesso!".to_string()
    }

    pub fn delete_success() -> String {
        "🗑️ Gasto deletado com sucesso!".to_string()
    }

    pub fn create_validation() -> String {
        "❌ Para criar um gasto é necessário:\n\
         • Descrição com no mínimo 1 caractere\n\
         • Valor maior que R$ 0,00\n\n\
         💬 Precisa de ajuda? É só perguntar!"
            .to_string()
    }

    pub fn create_error() -> String {
        "❌ Ops! Algo deu errado ao criar o gasto.\n\n\
         Tente novamente em alguns instantes.\n\n\
         📞 Precisa de ajuda? Digite \"Suporte\""
            .to_string()
    }

    pub fn delete_error() -> String {
        "❌ Ops! Algo deu errado ao tentar deletar o gasto.\n\n\
         Tente novamente em alguns instantes.\n\n\
         📞 Precisa de ajuda? Digite \"Suporte\""
            .to_string()
    }

    pub fn consult_error() -> String {
        "❌ Erro ao buscar seus gastos.\n\n\
         Tente novamente em alguns instantes.\n\n\
         📞 Precisa de ajuda? Digite \"Suporte\""
            .to_string()
    }

    pub fn not_found() -> String {
        "❌ *Gasto não encontrado*\n\n\
         O ID informado não existe.\n\
         Verifique se copiou corretamente.\n\n\
         💡 Use _\"Meus gastos recentes\"_ para ver os últimos"
            .to_string()
    }

    pub fn none_found() -> String {
        "📭 *Nenhum gasto encontrado*\n\n\
         Você ainda não registrou gastos.\n\
         Comece agora! É só me dizer o que gastou.\n\n\
         💡 _Exemplo: \"Gastei 50 reais no almoço\"_"
            .to_string()
    }

    pub fn invalid_period() -> String {
        "❌ Período inválido. Use: hoje, semana, mes ou ano".to_string()
    }
}

/// Goal (meta) messages.
pub mod metas {
    use super::*;

    pub fn create_success(name: &str, value: Decimal, prazo: &str) -> String {
        format!(
            "✅ *META CRIADA COM SUCESSO!*\n\n\
             🎯 {name}\n\
             💵 Valor: {}\n\
             📅 Prazo: {prazo}\n\n\
             💪 Vamos alcançar essa meta juntos!",
            brl(value),
        )
    }

    pub fn list_success(metas: &[Goal]) -> String {
        if metas.is_empty() {
            return "📊 *SUAS METAS*\n\n\
                    Você ainda não possui metas cadastradas.\n\n\
                    💡 Digite \"Suporte\" para aprender a criar uma meta"
                .to_string();
        }

        let mut resultado = String::from("🎯 *SUAS METAS*\n\n");
        for meta in metas {
            let (barra, progresso) = progress_bar(meta.value_actual, meta.value);
            resultado.push_str(&format!(
                "• *{}*\n\n\
                 \u{20}\u{20}🟢 {}  /  {}\n\n\
                 \u{20}\u{20}📅 {}\n\n\
                 \u{20}\u{20}{barra} {progresso:.1}%\n\n\
                 \u{20}\u{20}⚙️ `{}`\n\n",
                meta.name,
                brl(meta.value_actual),
                brl(meta.value),
                meta.time.format("%d/%m/%Y"),
                meta.id,
            ));
        }
        resultado
    }

    pub fn update_success(name: &str, value_actual: Decimal, value_total: Decimal) -> String {
        let (barra, progresso) = progress_bar(value_actual, value_total);
        let status = if progresso >= 100.0 {
            "🎉 *Parabéns! Meta atingida!*".to_string()
        } else {
            format!("💪 Faltam {}", brl(value_total - value_actual))
        };
        format!(
            "🆙 *META ATUALIZADA!*\n\n\
             🎯  {name}\n\n\
             🟢 {}  /  {}\n\n\
             {status}\n\n\
             {barra} {progresso:.1}%",
            brl(value_actual),
            brl(value_total),
        )
    }

    pub fn view_success(meta: &Goal) -> String {
        let (barra, progresso) = progress_bar(meta.value_actual, meta.value);
        let status = if progresso >= 100.0 {
            "✅ Concluída"
        } else {
            "⏳ Em andamento"
        };
        let rodape = if progresso >= 100.0 {
            "🎉 *Parabéns! Você atingiu sua meta!*".to_string()
        } else {
            format!(
                "💪 Faltam {} para atingir a meta",
                brl(meta.value - meta.value_actual)
            )
        };
        format!(
            "🎯 *{}*\n{status}\n\n\
             💰 Atual: {}\n\n\
             🎯 Meta: {}\n\n\
             📅 Prazo: {}\n\n\
             {rodape}\n\n\
             {barra} {progresso:.1}%\n\n\
             ⚙️ `{}`",
            meta.name,
            brl(meta.value_actual),
            brl(meta.value),
            meta.time.format("%d/%m/%Y"),
            meta.id,
        )
    }

    pub fn delete_success() -> String {
        "🗑️ Meta deletada com sucesso!".to_string()
    }

    pub fn not_found() -> String {
        "❌ *Meta não encontrada*\n\n\
         O ID informado não existe.\n\
         Verifique se copiou corretamente.\n\n\
         💡 Use _\"Minhas metas\"_ para ver todas"
            .to_string()
    }

    pub fn invalid_date() -> String {
        "❌ Data inválida. Use o formato DD/MM/YYYY".to_string()
    }

    pub fn create_error() -> String {
        "❌ Erro ao criar meta. Tente novamente.".to_string()
    }

    pub fn update_error() -> String {
        "❌ Erro ao atualizar meta. Tente novamente.".to_string()
    }

    pub fn delete_error() -> String {
        "❌ Erro ao deletar meta. Tente novamente.".to_string()
    }

    pub fn consult_error() -> String {
        "❌ Erro ao buscar meta. Tente novamente.".to_string()
    }
}

/// Application-wide error messages.
pub mod base {
    pub fn user_not_found() -> String {
        "🚫 *Acesso negado*\n\n\
         Você ainda não tem acesso ao serviço.\n\n\
         🌐 Assine agora e tenha controle total das suas finanças:\n\
         www.seusite.com/assinar\n\n\
         💰 Planos a partir de R$ 9,90/mês"
            .to_string()
    }

    pub fn expired_subscription() -> String {
        "⏰ *Assinatura expirada!*\n\n\
         Renove agora para continuar usando:\n\
         www.seusite.com/renovar\n\n\
         ✨ Não perca o controle das suas finanças!"
            .to_string()
    }

    pub fn generic_error() -> String {
        "❌ Desculpe, ocorreu um erro ao processar sua mensagem. Tente novamente.".to_string()
    }

    pub fn not_permission() -> String {
        "🚨 *Sem permissão*\n\n\
         Você não pode alterar registros de outros usuários.\n\n\
         📞 Dúvidas? Contate: suporte@seusite.com"
            .to_string()
    }
}

/// Help text.
pub mod help {
    pub fn commands() -> String {
        "👋 *Olá! Eu sou seu assistente financeiro pessoal!*\n\n\
         Fale comigo como falaria com um amigo: eu registro gastos,\n\
         mostro relatórios e acompanho suas metas.\n\n\
         💰 *Registrar gastos*\n\
         • _\"Gastei 45 reais no almoço\"_\n\
         • _\"Paguei 80 de Uber\"_\n\
         • _\"150 na conta de luz\"_\n\n\
         📊 *Ver e analisar*\n\
         • _\"Meus gastos recentes\"_\n\
         • _\"Gastos de hoje / desta semana / do mês / do ano\"_\n\
         • _\"Quanto gastei em transporte este mês?\"_\n\n\
         🛠️ *Editar ou remover*\n\
         • _\"Deletar o último gasto\"_\n\
         • _\"Excluir gasto #ID\"_ (use o ID das confirmações)\n\
         • _\"Editar gasto #ID para 50 reais em lazer\"_\n\n\
         🎯 *Metas*\n\
         • _\"Criar meta carro novo 10000 20/10/2027\"_\n\
         • _\"Minhas metas\"_\n\
         • _\"Adicionei 200 na meta #ID\"_\n\n\
         📱 *Categorias:* alimentacao 🍱, transporte 🚕, moradia 🏠,\n\
         saude 🧑🏻‍⚕️, educacao 📖, lazer 🎰, outros 💸"
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_create_success_contains_header_and_id() {
        let id: Uuid = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        let data = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let msg = gastos::create_success("almoco", Category::Alimentacao, dec("50.00"), data, id);
        assert!(msg.contains("GASTO REGISTRADO COM SUCESSO"));
        assert!(msg.contains("R$ 50.00"));
        assert!(msg.contains("30/08/2026"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_category_table_lists_all_seven() {
        let mut por_categoria = HashMap::new();
        por_categoria.insert(Category::Transporte, dec("30.00"));
        let msg = gastos::consult_all_success(dec("30.00"), &por_categoria);
        for cat in ALL_CATEGORIES {
            assert!(msg.contains(cat.label()), "missing {}", cat.label());
        }
        assert!(msg.contains("Transporte: R$ 30.00"));
        assert!(msg.contains("Alimentação: R$ 0.00"));
    }

    #[test]
    fn test_period_header_uppercased() {
        let msg = gastos::consult_period_success("este mês", dec("10.00"), &HashMap::new());
        assert!(msg.contains("ESTE MÊS"));
    }

    #[test]
    fn test_progress_bar_bounds() {
        let (bar, pct) = progress_bar(dec("0"), dec("100"));
        assert_eq!(bar, "░░░░░░░░░░");
        assert_eq!(pct, 0.0);

        let (bar, pct) = progress_bar(dec("100"), dec("100"));
        assert_eq!(bar, "██████████");
        assert_eq!(pct, 100.0);

        let (bar, _) = progress_bar(dec("50"), dec("100"));
        assert_eq!(bar, "█████░░░░░");

        // Zero target never divides by zero.
        let (_, pct) = progress_bar(dec("10"), dec("0"));
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn test_goal_update_variants() {
        let partial = metas::update_success("carro", dec("500"), dec("1000"));
        assert!(partial.contains("Faltam R$ 500.00"));
        assert!(!partial.contains("Meta atingida"));

        let reached = metas::update_success("carro", dec("1000"), dec("1000"));
        assert!(reached.contains("Parabéns! Meta atingida!"));
    }

    #[test]
    fn test_empty_goal_list() {
        let msg = metas::list_success(&[]);
        assert!(msg.contains("não possui metas"));
    }

    #[test]
    fn test_base_messages_stable() {
        assert!(base::user_not_found().contains("Acesso negado"));
        assert!(base::expired_subscription().contains("Assinatura expirada"));
        assert!(base::not_permission().contains("Sem permissão"));
    }

    #[test]
    fn test_help_mentions_all_categories() {
        let msg = help::commands();
        for name in ["alimentacao", "transporte", "moradia", "lazer"] {
            assert!(msg.contains(name));
        }
    }
}
