//! Expense (gasto) tools.

use super::{parse_record_id, ToolContext};
use chrono::{Datelike, Duration, Local, NaiveDate};
use finbot_core::{
    category::Category,
    error::ApiError,
    messages::{base, gastos},
    model::{Expense, ExpenseUpdate, NewExpense},
    phone::strip_accents,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

fn bad_args(tool: &str, raw: &str) -> String {
    warn!("{tool}: unparseable arguments: {raw}");
    base::generic_error()
}

/// Sum a page of expenses into a grand total plus per-category totals.
fn totals_by_category(gastos: &[Expense]) -> (Decimal, HashMap<Category, Decimal>) {
    let mut por_categoria: HashMap<Category, Decimal> = HashMap::new();
    let mut total = Decimal::ZERO;
    for gasto in gastos {
        let cat = gasto
            .categoria_name
            .as_deref()
            .and_then(Category::from_name)
            .unwrap_or(Category::Outros);
        *por_categoria.entry(cat).or_default() += gasto.value;
        total += gasto.value;
    }
    (total, por_categoria)
}

/// Date window for a named period, anchored at `today`; also yields the
/// label used in the summary header.
pub(crate) fn period_window(
    periodo: &str,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate, &'static str)> {
    match periodo {
        "hoje" => Some((today, today, "hoje")),
        "semana" => Some((today - Duration::days(7), today, "esta semana")),
        "mes" => today.with_day(1).map(|start| (start, today, "este mês")),
        "ano" => NaiveDate::from_ymd_opt(today.year(), 1, 1)
            .map(|start| (start, today, "este ano")),
        _ => None,
    }
}

#[derive(Deserialize)]
struct AdicionarGastoArgs {
    valor: Decimal,
    categoria: String,
    descricao: String,
}

pub async fn adicionar_gasto(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: AdicionarGastoArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("adicionar_gasto", arguments),
    };

    let descricao = strip_accents(&args.descricao);
    if args.valor <= Decimal::ZERO || descricao.trim().is_empty() {
        return gastos::create_validation();
    }

    let (categoria, categoria_id) = match ctx.mapping.category_id(&args.categoria).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!("adicionar_gasto: category lookup failed: {e}");
            return gastos::create_error();
        }
    };

    let novo = NewExpense {
        message: descricao.clone(),
        value: args.valor,
        categoria_id,
        user_id: ctx.identity.user_id,
    };
    match ctx.api.create_expense(&novo).await {
        Ok(criado) => {
            gastos::create_success(&descricao, categoria, args.valor, criado.created_at, criado.id)
        }
        Err(e) => {
            warn!("adicionar_gasto: create failed: {e}");
            gastos::create_error()
        }
    }
}

#[derive(Deserialize)]
struct GastoIdArgs {
    gasto_id: String,
}

pub async fn ver_gasto(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: GastoIdArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("ver_gasto", arguments),
    };
    let Some(id) = parse_record_id(&args.gasto_id) else {
        return gastos::not_found();
    };

    match ctx.api.get_expense(id).await {
        Ok(gasto) if gasto.user_id != ctx.identity.user_id => base::not_permission(),
        Ok(gasto) => {
            let categoria = gasto.categoria_name.as_deref().unwrap_or("outros").to_string();
            gastos::consult_success(&gasto, &categoria)
        }
        Err(ApiError::NotFound) => gastos::not_found(),
        Err(e) => {
            warn!("ver_gasto: fetch failed: {e}");
            gastos::consult_error()
        }
    }
}

#[derive(Deserialize)]
struct ListarRecentesArgs {
    #[serde(default = "default_limite")]
    limite: u32,
}

fn default_limite() -> u32 {
    5
}

pub async fn listar_gastos_recentes(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: ListarRecentesArgs =
        serde_json::from_str(arguments).unwrap_or(ListarRecentesArgs { limite: 5 });

    match ctx.api.list_expenses(ctx.identity.user_id, args.limite, None).await {
        Ok(page) if page.gastos.is_empty() => gastos::none_found(),
        Ok(page) => gastos::recent_list(&page.gastos),
        Err(e) => {
            warn!("listar_gastos_recentes: list failed: {e}");
            gastos::consult_error()
        }
    }
}

pub async fn listar_gastos(ctx: &ToolContext<'_>) -> String {
    match ctx.api.list_expenses(ctx.identity.user_id, 200, None).await {
        Ok(page) if page.gastos.is_empty() => gastos::none_found(),
        Ok(page) => {
            let (total, por_categoria) = totals_by_category(&page.gastos);
            gastos::consult_all_success(total, &por_categoria)
        }
        Err(e) => {
            warn!("listar_gastos: list failed: {e}");
            gastos::consult_error()
        }
    }
}

#[derive(Deserialize)]
struct PeriodoArgs {
    periodo: String,
}

pub async fn gastos_periodo(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: PeriodoArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("gastos_periodo", arguments),
    };

    let hoje = Local::now().date_naive();
    let Some((start, end, label)) = period_window(args.periodo.trim(), hoje) else {
        return gastos::invalid_period();
    };

    match ctx
        .api
        .list_expenses(ctx.identity.user_id, 1000, Some((start, end)))
        .await
    {
        Ok(page) if page.gastos.is_empty() => gastos::none_found(),
        Ok(page) => {
            let (total, por_categoria) = totals_by_category(&page.gastos);
            gastos::consult_period_success(label, total, &por_categoria)
        }
        Err(e) => {
            warn!("gastos_periodo: list failed: {e}");
            gastos::consult_error()
        }
    }
}

#[derive(Deserialize)]
struct CategoriaArgs {
    categoria: String,
}

pub async fn total_por_categoria(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: CategoriaArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("total_por_categoria", arguments),
    };

    let (categoria, categoria_id) = match ctx.mapping.category_id(&args.categoria).await {
        Ok(pair) => pair,
        Err(e) => {
            warn!("total_por_categoria: category lookup failed: {e}");
            return gastos::consult_error();
        }
    };

    let hoje = Local::now().date_naive();
    let Some(start) = hoje.with_day(1) else {
        return gastos::consult_error();
    };

    match ctx
        .api
        .list_expenses(ctx.identity.user_id, 1000, Some((start, hoje)))
        .await
    {
        Ok(page) => {
            let total: Decimal = page
                .gastos
                .iter()
                .filter(|g| g.categoria_id == categoria_id)
                .map(|g| g.value)
                .sum();
            if total.is_zero() {
                gastos::category_empty(categoria)
            } else {
                gastos::category_total(categoria, total)
            }
        }
        Err(e) => {
            warn!("total_por_categoria: list failed: {e}");
            gastos::consult_error()
        }
    }
}

#[derive(Deserialize)]
struct EditarGastoArgs {
    gasto_id: String,
    #[serde(default)]
    novo_valor: Option<Decimal>,
    #[serde(default)]
    nova_descricao: Option<String>,
    #[serde(default)]
    nova_categoria: Option<String>,
}

pub async fn editar_gasto(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: EditarGastoArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("editar_gasto", arguments),
    };
    let Some(id) = parse_record_id(&args.gasto_id) else {
        return gastos::not_found();
    };

    let atual = match ctx.api.get_expense(id).await {
        Ok(g) => g,
        Err(ApiError::NotFound) => return gastos::not_found(),
        Err(e) => {
            warn!("editar_gasto: fetch failed: {e}");
            return gastos::consult_error();
        }
    };
    if atual.user_id != ctx.identity.user_id {
        return base::not_permission();
    }

    let categoria_id = match &args.nova_categoria {
        Some(nome) => match ctx.mapping.category_id(nome).await {
            Ok((_, id)) => id,
            Err(e) => {
                warn!("editar_gasto: category lookup failed: {e}");
                return gastos::create_error();
            }
        },
        None => atual.categoria_id,
    };

    let message = match &args.nova_descricao {
        Some(d) => strip_accents(d),
        None => atual.message.clone(),
    };
    let update = ExpenseUpdate {
        message,
        value: args.novo_valor.unwrap_or(atual.value),
        categoria_id,
    };

    match ctx.api.update_expense(id, ctx.identity.user_id, &update).await {
        Ok(()) => gastos::edit_success(),
        Err(e) => {
            warn!("editar_gasto: update failed: {e}");
            gastos::create_error()
        }
    }
}

pub async fn deletar_gasto(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: GastoIdArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("deletar_gasto", arguments),
    };
    let Some(id) = parse_record_id(&args.gasto_id) else {
        return gastos::not_found();
    };

    // Ownership is checked before any mutation is issued.
    match ctx.api.get_expense(id).await {
        Ok(gasto) if gasto.user_id != ctx.identity.user_id => return base::not_permission(),
        Ok(_) => {}
        Err(ApiError::NotFound) => return gastos::not_found(),
        Err(e) => {
            warn!("deletar_gasto: fetch failed: {e}");
            return gastos::delete_error();
        }
    }

    match ctx.api.delete_expense(id, ctx.identity.user_id).await {
        Ok(()) => gastos::delete_success(),
        Err(ApiError::NotFound) => gastos::not_found(),
        Err(e) => {
            warn!("deletar_gasto: delete failed: {e}");
            gastos::delete_error()
        }
    }
}

pub async fn deletar_ultimo_gasto(ctx: &ToolContext<'_>) -> String {
    let page = match ctx.api.last_expense(ctx.identity.user_id).await {
        Ok(p) => p,
        Err(ApiError::NotFound) => return gastos::none_found(),
        Err(e) => {
            warn!("deletar_ultimo_gasto: fetch failed: {e}");
            return gastos::delete_error();
        }
    };
    let Some(gasto) = page.gastos.first() else {
        return gastos::none_found();
    };

    match ctx.api.delete_expense(gasto.id, ctx.identity.user_id).await {
        Ok(()) => gastos::last_deleted(gasto),
        Err(e) => {
            warn!("deletar_ultimo_gasto: delete failed: {e}");
            gastos::delete_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiClient;
    use crate::resolver::MappingService;
    use crate::tools::ToolContext;
    use chrono::Utc;
    use finbot_channels::WahaClient;
    use finbot_core::config::{BackendConfig, WahaConfig};
    use finbot_core::identity::UserIdentity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(value: &str, categoria_name: &str) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            message: "x".into(),
            value: dec(value),
            categoria_id: Uuid::new_v4(),
            categoria_name: Some(categoria_name.into()),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_period_window_hoje() {
        let today = ymd(2026, 8, 30);
        assert_eq!(period_window("hoje", today), Some((today, today, "hoje")));
    }

    #[test]
    fn test_period_window_semana_spans_seven_days() {
        let today = ymd(2026, 8, 30);
        let (start, end, label) = period_window("semana", today).unwrap();
        assert_eq!(start, ymd(2026, 8, 23));
        assert_eq!(end, today);
        assert_eq!(label, "esta semana");
    }

    #[test]
    fn test_period_window_mes_starts_at_first() {
        let today = ymd(2026, 8, 30);
        let (start, _, _) = period_window("mes", today).unwrap();
        assert_eq!(start, ymd(2026, 8, 1));
    }

    #[test]
    fn test_period_window_ano_starts_january() {
        let today = ymd(2026, 8, 30);
        let (start, _, label) = period_window("ano", today).unwrap();
        assert_eq!(start, ymd(2026, 1, 1));
        assert_eq!(label, "este ano");
    }

    #[test]
    fn test_period_window_rejects_unknown() {
        assert!(period_window("ontem", ymd(2026, 8, 30)).is_none());
        assert!(period_window("", ymd(2026, 8, 30)).is_none());
    }

    #[test]
    fn test_totals_group_by_category() {
        let gastos = vec![
            expense("10.00", "alimentacao"),
            expense("20.00", "alimentacao"),
            expense("5.50", "transporte"),
            expense("1.00", "desconhecida"),
        ];
        let (total, por_categoria) = totals_by_category(&gastos);
        assert_eq!(total, dec("36.50"));
        assert_eq!(por_categoria[&Category::Alimentacao], dec("30.00"));
        assert_eq!(por_categoria[&Category::Transporte], dec("5.50"));
        // Unknown backend names land in the catch-all bucket.
        assert_eq!(por_categoria[&Category::Outros], dec("1.00"));
    }

    /// Serve one expense record and count delete calls, on an ephemeral
    /// local port.
    async fn stub_backend(gasto: serde_json::Value, deletes: Arc<AtomicUsize>) -> String {
        use axum::{routing, Json, Router};

        let fetched = move || {
            let g = gasto.clone();
            async move { Json(g) }
        };
        let deleted = move || {
            let d = deletes.clone();
            async move {
                d.fetch_add(1, Ordering::SeqCst);
                Json(serde_json::json!({}))
            }
        };
        let app = Router::new()
            .route("/bot/gastos/{id}", routing::get(fetched))
            .route("/bot/gastos/{id}/{user}", routing::delete(deleted));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn tool_ctx_parts(base_url: &str) -> (UserIdentity, ApiClient, MappingService) {
        let backend = BackendConfig {
            base_url: base_url.to_string(),
            api_key: "test".into(),
        };
        let waha = WahaClient::new(
            &WahaConfig {
                base_url: "http://127.0.0.1:1".into(),
                api_key: "test".into(),
                session: "default".into(),
            },
            "55",
        );
        let identity = UserIdentity {
            user_id: Uuid::new_v4(),
            phone: "19992115781".into(),
        };
        let api = ApiClient::new(&backend);
        let mapping =
            MappingService::new(Arc::new(waha), Arc::new(ApiClient::new(&backend)), "55".into());
        (identity, api, mapping)
    }

    fn gasto_json(id: Uuid, owner: Uuid) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "message": "almoco",
            "value": "50.00",
            "categoria_id": Uuid::new_v4(),
            "categoria_name": "alimentacao",
            "user_id": owner,
            "created_at": "2026-08-30T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_deletar_gasto_foreign_record_denied_without_delete() {
        let gasto_id = Uuid::new_v4();
        let deletes = Arc::new(AtomicUsize::new(0));
        // Record owned by someone else entirely.
        let base_url = stub_backend(gasto_json(gasto_id, Uuid::new_v4()), deletes.clone()).await;
        let (identity, api, mapping) = tool_ctx_parts(&base_url);
        let ctx = ToolContext {
            identity: &identity,
            api: &api,
            mapping: &mapping,
        };

        let out = deletar_gasto(&ctx, &format!(r#"{{"gasto_id": "{gasto_id}"}}"#)).await;
        assert_eq!(out, finbot_core::messages::base::not_permission());
        assert_eq!(deletes.load(Ordering::SeqCst), 0, "no delete may be issued");
    }

    #[tokio::test]
    async fn test_deletar_gasto_own_record_deletes() {
        let gasto_id = Uuid::new_v4();
        let deletes = Arc::new(AtomicUsize::new(0));
        let (identity, _, _) = tool_ctx_parts("http://127.0.0.1:1");
        let base_url = stub_backend(gasto_json(gasto_id, identity.user_id), deletes.clone()).await;
        let (_, api, mapping) = tool_ctx_parts(&base_url);
        let ctx = ToolContext {
            identity: &identity,
            api: &api,
            mapping: &mapping,
        };

        let out = deletar_gasto(&ctx, &format!(r#"{{"gasto_id": "{gasto_id}"}}"#)).await;
        assert_eq!(out, gastos::delete_success());
        assert_eq!(deletes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_adicionar_args_accept_number_or_string_value() {
        let from_number: AdicionarGastoArgs =
            serde_json::from_str(r#"{"valor": 50.0, "categoria": "alimentacao", "descricao": "almoço"}"#)
                .unwrap();
        assert_eq!(from_number.valor, dec("50"));

        let from_string: AdicionarGastoArgs =
            serde_json::from_str(r#"{"valor": "50.00", "categoria": "lazer", "descricao": "cinema"}"#)
                .unwrap();
        assert_eq!(from_string.valor, dec("50.00"));
    }

    #[test]
    fn test_editar_args_all_optional_but_id() {
        let args: EditarGastoArgs =
            serde_json::from_str(r#"{"gasto_id": "550e8400-e29b-41d4-a716-446655440000"}"#).unwrap();
        assert!(args.novo_valor.is_none());
        assert!(args.nova_descricao.is_none());
        assert!(args.nova_categoria.is_none());
    }
}
