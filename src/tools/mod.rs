//! Finance tools exposed to the model.
//!
//! Every tool receives an explicit `ToolContext` carrying the resolved
//! identity and the shared services — nothing is pulled from ambient
//! state. Tools always return user-facing Portuguese text: failures map
//! to canned messages, never to errors crossing the agent loop.

mod expenses;
mod goals;

use crate::api_client::ApiClient;
use crate::resolver::MappingService;
use finbot_core::{
    chat::ToolDef,
    identity::UserIdentity,
    messages::{base, help},
};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

/// Identity and services handed to each tool invocation.
pub struct ToolContext<'a> {
    pub identity: &'a UserIdentity,
    pub api: &'a ApiClient,
    pub mapping: &'a MappingService,
}

/// Parse a record id as the model tends to echo it: possibly wrapped in
/// backticks or prefixed with `#`.
pub(crate) fn parse_record_id(raw: &str) -> Option<Uuid> {
    raw.trim().trim_matches('`').trim_start_matches('#').parse().ok()
}

fn schema(properties: serde_json::Value, required: &[&str]) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// The fixed toolset advertised to the model.
pub fn definitions() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "adicionar_gasto".into(),
            description: "Adiciona um novo gasto do usuário. Use quando o usuário relatar \
                          um gasto (ex: \"gastei 50 no almoço\")."
                .into(),
            parameters: schema(
                json!({
                    "valor": {"type": "number", "description": "Valor em reais, positivo"},
                    "categoria": {"type": "string", "description": "Uma de: alimentacao, transporte, moradia, saude, educacao, lazer, outros"},
                    "descricao": {"type": "string", "description": "Descrição do gasto (ex: almoço, uber)"}
                }),
                &["valor", "categoria", "descricao"],
            ),
        },
        ToolDef {
            name: "ver_gasto".into(),
            description: "Exibe detalhes de um gasto específico pelo ID.".into(),
            parameters: schema(
                json!({
                    "gasto_id": {"type": "string", "description": "UUID do gasto"}
                }),
                &["gasto_id"],
            ),
        },
        ToolDef {
            name: "listar_gastos_recentes".into(),
            description: "Lista os gastos mais recentes do usuário.".into(),
            parameters: schema(
                json!({
                    "limite": {"type": "integer", "description": "Quantos gastos listar (padrão 5)"}
                }),
                &[],
            ),
        },
        ToolDef {
            name: "listar_gastos".into(),
            description: "Visão geral de todos os gastos do usuário, com total por categoria."
                .into(),
            parameters: schema(json!({}), &[]),
        },
        ToolDef {
            name: "gastos_periodo".into(),
            description: "Resumo de gastos de um período, com total por categoria.".into(),
            parameters: schema(
                json!({
                    "periodo": {"type": "string", "description": "Um de: hoje, semana, mes, ano"}
                }),
                &["periodo"],
            ),
        },
        ToolDef {
            name: "total_por_categoria".into(),
            description: "Total gasto em uma categoria específica no mês atual.".into(),
            parameters: schema(
                json!({
                    "categoria": {"type": "string", "description": "Nome da categoria"}
                }),
                &["categoria"],
            ),
        },
        ToolDef {
            name: "editar_gasto".into(),
            description: "Edita um gasto existente. Campos não informados permanecem.".into(),
            parameters: schema(
                json!({
                    "gasto_id": {"type": "string", "description": "UUID do gasto"},
                    "novo_valor": {"type": "number", "description": "Novo valor (opcional)"},
                    "nova_descricao": {"type": "string", "description": "Nova descrição (opcional)"},
                    "nova_categoria": {"type": "string", "description": "Nova categoria (opcional)"}
                }),
                &["gasto_id"],
            ),
        },
        ToolDef {
            name: "deletar_gasto".into(),
            description: "Deleta um gasto específico pelo ID.".into(),
            parameters: schema(
                json!({
                    "gasto_id": {"type": "string", "description": "UUID do gasto"}
                }),
                &["gasto_id"],
            ),
        },
        ToolDef {
            name: "deletar_ultimo_gasto".into(),
            description: "Deleta o último gasto registrado pelo usuário.".into(),
            parameters: schema(json!({}), &[]),
        },
        ToolDef {
            name: "criar_meta".into(),
            description: "Cria uma nova meta financeira com prazo.".into(),
            parameters: schema(
                json!({
                    "nome": {"type": "string", "description": "Nome da meta"},
                    "valor": {"type": "number", "description": "Valor alvo em reais"},
                    "prazo": {"type": "string", "description": "Data limite no formato DD/MM/YYYY"}
                }),
                &["nome", "valor", "prazo"],
            ),
        },
        ToolDef {
            name: "listar_metas".into(),
            description: "Lista todas as metas do usuário com progresso.".into(),
            parameters: schema(json!({}), &[]),
        },
        ToolDef {
            name: "ver_meta".into(),
            description: "Exibe detalhes de uma meta específica pelo ID.".into(),
            parameters: schema(
                json!({
                    "meta_id": {"type": "string", "description": "UUID da meta"}
                }),
                &["meta_id"],
            ),
        },
        ToolDef {
            name: "adicionar_valor_meta".into(),
            description: "Adiciona valor ao progresso de uma meta existente.".into(),
            parameters: schema(
                json!({
                    "meta_id": {"type": "string", "description": "UUID da meta"},
                    "valor": {"type": "number", "description": "Valor a adicionar, positivo"}
                }),
                &["meta_id", "valor"],
            ),
        },
        ToolDef {
            name: "deletar_meta".into(),
            description: "Deleta uma meta específica pelo ID.".into(),
            parameters: schema(
                json!({
                    "meta_id": {"type": "string", "description": "UUID da meta"}
                }),
                &["meta_id"],
            ),
        },
        ToolDef {
            name: "ajuda".into(),
            description: "Mostra os comandos disponíveis. Use quando o usuário pedir ajuda, \
                          suporte, tutorial ou perguntar como usar o assistente."
                .into(),
            parameters: schema(json!({}), &[]),
        },
    ]
}

/// Execute a tool by name. Malformed arguments and unknown names degrade
/// to canned messages so the agent loop always gets text back.
pub async fn dispatch(ctx: &ToolContext<'_>, name: &str, arguments: &str) -> String {
    match name {
        "adicionar_gasto" => expenses::adicionar_gasto(ctx, arguments).await,
        "ver_gasto" => expenses::ver_gasto(ctx, arguments).await,
        "listar_gastos_recentes" => expenses::listar_gastos_recentes(ctx, arguments).await,
        "listar_gastos" => expenses::listar_gastos(ctx).await,
        "gastos_periodo" => expenses::gastos_periodo(ctx, arguments).await,
        "total_por_categoria" => expenses::total_por_categoria(ctx, arguments).await,
        "editar_gasto" => expenses::editar_gasto(ctx, arguments).await,
        "deletar_gasto" => expenses::deletar_gasto(ctx, arguments).await,
        "deletar_ultimo_gasto" => expenses::deletar_ultimo_gasto(ctx).await,
        "criar_meta" => goals::criar_meta(ctx, arguments).await,
        "listar_metas" => goals::listar_metas(ctx).await,
        "ver_meta" => goals::ver_meta(ctx, arguments).await,
        "adicionar_valor_meta" => goals::adicionar_valor_meta(ctx, arguments).await,
        "deletar_meta" => goals::deletar_meta(ctx, arguments).await,
        "ajuda" => help::commands(),
        other => {
            warn!("model requested unknown tool: {other}");
            base::generic_error()
        }
    }
}
