//! Goal (meta) tools.

use super::{parse_record_id, ToolContext};
use chrono::NaiveDate;
use finbot_core::{
    error::ApiError,
    messages::{base, metas},
    model::NewGoal,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

fn bad_args(tool: &str, raw: &str) -> String {
    warn!("{tool}: unparseable arguments: {raw}");
    base::generic_error()
}

/// Advance accumulated progress, clamped to `[0, target]`. The added
/// amount comes from the model and may be negative.
pub(crate) fn advance_progress(actual: Decimal, added: Decimal, target: Decimal) -> Decimal {
    (actual + added).clamp(Decimal::ZERO, target)
}

#[derive(Deserialize)]
struct CriarMetaArgs {
    nome: String,
    valor: Decimal,
    prazo: String,
}

pub async fn criar_meta(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: CriarMetaArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("criar_meta", arguments),
    };

    let Ok(prazo) = NaiveDate::parse_from_str(args.prazo.trim(), "%d/%m/%Y") else {
        return metas::invalid_date();
    };
    if args.valor <= Decimal::ZERO || args.nome.trim().is_empty() {
        return metas::create_error();
    }

    let nova = NewGoal {
        name: args.nome.clone(),
        value: args.valor,
        value_actual: Decimal::ZERO,
        time: prazo,
        user_id: ctx.identity.user_id,
    };
    match ctx.api.create_goal(&nova).await {
        Ok(()) => metas::create_success(&args.nome, args.valor, args.prazo.trim()),
        Err(e) => {
            warn!("criar_meta: create failed: {e}");
            metas::create_error()
        }
    }
}

pub async fn listar_metas(ctx: &ToolContext<'_>) -> String {
    match ctx.api.list_goals(ctx.identity.user_id, 50).await {
        Ok(page) => metas::list_success(&page.metas),
        Err(e) => {
            warn!("listar_metas: list failed: {e}");
            metas::consult_error()
        }
    }
}

#[derive(Deserialize)]
struct MetaIdArgs {
    meta_id: String,
}

pub async fn ver_meta(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: MetaIdArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("ver_meta", arguments),
    };
    let Some(id) = parse_record_id(&args.meta_id) else {
        return metas::not_found();
    };

    match ctx.api.get_goal(id).await {
        Ok(meta) if meta.user_id != ctx.identity.user_id => base::not_permission(),
        Ok(meta) => metas::view_success(&meta),
        Err(ApiError::NotFound) => metas::not_found(),
        Err(e) => {
            warn!("ver_meta: fetch failed: {e}");
            metas::consult_error()
        }
    }
}

#[derive(Deserialize)]
struct AdicionarValorArgs {
    meta_id: String,
    valor: Decimal,
}

pub async fn adicionar_valor_meta(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: AdicionarValorArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("adicionar_valor_meta", arguments),
    };
    let Some(id) = parse_record_id(&args.meta_id) else {
        return metas::not_found();
    };

    let meta = match ctx.api.get_goal(id).await {
        Ok(m) => m,
        Err(ApiError::NotFound) => return metas::not_found(),
        Err(e) => {
            warn!("adicionar_valor_meta: fetch failed: {e}");
            return metas::update_error();
        }
    };
    if meta.user_id != ctx.identity.user_id {
        return base::not_permission();
    }

    let novo_actual = advance_progress(meta.value_actual, args.valor, meta.value);
    match ctx.api.update_goal_progress(id, novo_actual).await {
        Ok(()) => metas::update_success(&meta.name, novo_actual, meta.value),
        Err(ApiError::NotFound) => metas::not_found(),
        Err(e) => {
            warn!("adicionar_valor_meta: update failed: {e}");
            metas::update_error()
        }
    }
}

pub async fn deletar_meta(ctx: &ToolContext<'_>, arguments: &str) -> String {
    let args: MetaIdArgs = match serde_json::from_str(arguments) {
        Ok(a) => a,
        Err(_) => return bad_args("deletar_meta", arguments),
    };
    let Some(id) = parse_record_id(&args.meta_id) else {
        return metas::not_found();
    };

    // Ownership is checked before any mutation is issued.
    match ctx.api.get_goal(id).await {
        Ok(meta) if meta.user_id != ctx.identity.user_id => return base::not_permission(),
        Ok(_) => {}
        Err(ApiError::NotFound) => return metas::not_found(),
        Err(e) => {
            warn!("deletar_meta: fetch failed: {e}");
            return metas::delete_error();
        }
    }

    match ctx.api.delete_goal(id).await {
        Ok(()) => metas::delete_success(),
        Err(ApiError::NotFound) => metas::not_found(),
        Err(e) => {
            warn!("deletar_meta: delete failed: {e}");
            metas::delete_error()
        }
    }
}
