//! Agent loop: one inbound message in, one assistant text out.
//!
//! The primary provider drives a bounded tool-call loop; a rate-limit or
//! timeout on any primary call retries the whole conversation once
//! against the fallback. Every other failure degrades to the generic
//! error text so the user always gets a reply.

use crate::tools::{self, ToolContext};
use finbot_core::{
    chat::ChatMessage,
    messages::base,
    traits::ChatProvider,
};
use tracing::{debug, info, warn};

/// Upper bound on model turns per message.
const MAX_TOOL_ITERATIONS: usize = 6;

const SYSTEM_PROMPT: &str = "\
Você é um assistente financeiro via WhatsApp especializado em controle de gastos.

REGRAS IMPORTANTES:
1. Você DEVE usar exatamente a resposta retornada pelas ferramentas disponíveis, SEM MODIFICAR, adicionar ou remover qualquer parte do texto.
2. NÃO envie mensagens extras, comentários, pensamentos, logs ou quaisquer outras informações que NÃO sejam a resposta direta da ferramenta.
3. NÃO invente respostas, informações ou interpretações. Se a ferramenta não souber responder, peça esclarecimento objetivo ao usuário.
4. Sempre responda com uma única mensagem clara e objetiva.
5. NÃO altere as mensagens de sucesso ou erro retornadas pelas ferramentas.
6. Se não entender a solicitação do usuário, peça para reformular.
7. Caso seja necessario utilizar negrito na mensagem, apenas utilize *mensagem*, nunca utilize **mensagem**

QUANDO O USUÁRIO ENVIAR UM GASTO:
- Extraia: valor (número), categoria (inferir), descrição (texto)
- Categorias válidas: alimentacao, transporte, moradia, saude, educacao, lazer, outros
- Exemplos de inferência:
* \"gastei 50 no almoço\" → valor=50, categoria=alimentacao, descricao=\"almoço\"
* \"uber 30 reais\" → valor=30, categoria=transporte, descricao=\"uber\"
* \"conta de luz 200\" → valor=200, categoria=moradia, descricao=\"conta de luz\"

QUANDO O USUÁRIO CRIAR UMA META:
- Extraia: valor (número), nome (texto), data (time)
- Exemplo:
* \"Criar meta carro novo 10000 20/10/2027\" → valor=10000, nome=carro novo, time=20/10/2027

Lembre-se: seu único papel é de interface entre o usuário e as ferramentas, repassando as respostas exatamente como são, SEM MODIFICAÇÕES ou acréscimos.";

/// The final assistant reply plus audit metadata.
pub struct AgentReply {
    pub text: String,
    /// Provider that produced the final text, when one succeeded.
    pub provider: Option<String>,
    /// Model identifier reported by that provider.
    pub model: Option<String>,
    /// Set when the reply is the degraded generic-error text.
    pub failed: bool,
}

/// Drives providers and tools for one message.
pub struct AgentRunner {
    primary: Box<dyn ChatProvider>,
    fallback: Box<dyn ChatProvider>,
}

impl AgentRunner {
    pub fn new(primary: Box<dyn ChatProvider>, fallback: Box<dyn ChatProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Process one user message to a single assistant text.
    pub async fn run(&self, ctx: &ToolContext<'_>, user_text: &str) -> AgentReply {
        match self.drive(self.primary.as_ref(), ctx, user_text).await {
            Ok(reply) => reply,
            Err(e) if e.is_retryable() => {
                info!(
                    "{} unavailable ({e}), retrying conversation on {}",
                    self.primary.name(),
                    self.fallback.name()
                );
                match self.drive(self.fallback.as_ref(), ctx, user_text).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("fallback {} also failed: {e}", self.fallback.name());
                        AgentReply::degraded()
                    }
                }
            }
            Err(e) => {
                warn!("{} failed without fallback: {e}", self.primary.name());
                AgentReply::degraded()
            }
        }
    }

    /// Run the tool-call loop against one provider. Provider failures
    /// bubble up so the caller can decide about the fallback; tool
    /// failures do not, they already produced user-facing text.
    async fn drive(
        &self,
        provider: &dyn ChatProvider,
        ctx: &ToolContext<'_>,
        user_text: &str,
    ) -> Result<AgentReply, finbot_core::error::ProviderError> {
        let tool_defs = tools::definitions();
        let mut messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_text),
        ];

        for iteration in 0..MAX_TOOL_ITERATIONS {
            let turn = provider.chat(&messages, &tool_defs).await?;

            if !turn.wants_tools() {
                let text = turn.message.content.unwrap_or_default();
                return Ok(AgentReply {
                    text,
                    provider: Some(provider.name().to_string()),
                    model: turn.model,
                    failed: false,
                });
            }

            debug!(
                "iteration {iteration}: {} tool call(s) requested",
                turn.message.tool_calls.len()
            );
            let calls = turn.message.tool_calls.clone();
            messages.push(turn.message);
            for call in calls {
                let output = tools::dispatch(ctx, &call.function.name, &call.function.arguments).await;
                messages.push(ChatMessage::tool_result(call.id, output));
            }
        }

        warn!("tool loop exceeded {MAX_TOOL_ITERATIONS} iterations, giving up");
        Ok(AgentReply::degraded())
    }
}

impl AgentReply {
    fn degraded() -> Self {
        Self {
            text: base::generic_error(),
            provider: None,
            model: None,
            failed: true,
        }
    }
}
