//! Prompt builders that keep an LLM close to its sources.

use std::fmt::Write;

use nc_core::Article;

const CONTENT_PREVIEW_CHARS: usize = 200;

const GROUNDING_RULES: &str = "\
IMPORTANTE - REGLAS ESTRICTAS:
1. Basarte ÚNICAMENTE en la información proporcionada
2. NO inventar fechas, números o nombres
3. NO agregar información que no esté en los artículos
4. Si no tienes información sobre algo, NO lo menciones
5. Usar solo los datos exactos de las fuentes
6. NO hacer suposiciones o inferencias
7. Citar la fuente cuando sea posible
";

/// Prefixes `prompt` with the grounding rules and, when given, a numbered list
/// of the source articles.
pub fn enhance_prompt(prompt: &str, articles: &[Article]) -> String {
    let mut context = String::new();
    if !articles.is_empty() {
        context.push_str("\nARTÍCULOS FUENTE (usar SOLO esta información):\n");
        for (i, article) in articles.iter().enumerate() {
            let _ = write!(context, "\n{}. {}", i + 1, article.title);
            if let Some(subtitle) = article.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
                let _ = write!(context, "\n   Subtítulo: {}", subtitle);
            }
            if let Some(content) = article.content.as_deref().filter(|c| !c.trim().is_empty()) {
                let preview: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
                let _ = write!(context, "\n   Contenido: {}...", preview);
            }
            let _ = writeln!(context, "\n   Fuente: {}", article.source);
        }
    }

    format!("\n{}\n{}\n{}", GROUNDING_RULES, context, prompt)
}

/// Self-check prompt asking the model for a JSON verdict on `text`.
pub fn verification_prompt(text: &str) -> String {
    format!(
        r#"
Verifica el siguiente texto y responde:
1. ¿Contiene información no verificable? (Sí/No)
2. ¿Hay fechas o números específicos sin fuente? (Sí/No)
3. ¿Se hacen afirmaciones absolutas sin evidencia? (Sí/No)
4. ¿Hay entidades o nombres que parecen inventados? (Sí/No)

Texto a verificar:
{}

Responde en formato JSON:
{{"verificable": true/false, "issues": ["lista de problemas encontrados"]}}
"#,
        text
    )
}
