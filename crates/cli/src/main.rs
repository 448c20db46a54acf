#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use gemini_translate_core::config::{
    resolve_api_key, resolve_optional_string, resolve_string_with_default, Env, PluginConfig,
    StdEnv, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ENV_GEMINI_API_KEY,
    ENV_GEMINI_BASE_URL, ENV_GEMINI_MODEL,
};
use gemini_translate_core::translate::{
    GeminiTranslator, LanguagePair, ReqwestTransport, TranslateOptions, Translator,
};
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gemini-translate")]
#[command(about = "Translate text with the Gemini generateContent API")]
struct Args {
    /// Text to translate, or `-` to read it from stdin
    text: String,

    #[arg(long, default_value = "auto")]
    from: String,

    #[arg(long, default_value = "en")]
    to: String,

    #[arg(long)]
    api_key: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long, default_value = DEFAULT_TEMPERATURE)]
    temperature: String,

    #[arg(long, default_value = DEFAULT_MAX_OUTPUT_TOKENS)]
    max_output_tokens: String,

    #[arg(long)]
    enable_thinking: bool,

    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let text = read_text(&args.text)?;
    let languages = LanguagePair::new(args.from.clone(), args.to.clone());
    let env = StdEnv;
    let config = build_config(args, &env)?;

    tracing::info!(
        model = config.model.as_deref().unwrap_or(DEFAULT_MODEL),
        source_lang = %languages.source,
        target_lang = %languages.target,
        "config loaded"
    );

    let options = TranslateOptions::new(config).with_transport(Arc::new(ReqwestTransport::new()));
    let translator = GeminiTranslator::new(options);
    let translation = translator
        .translate(text, languages)
        .await
        .context("translation failed")?;

    println!("{translation}");
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_text(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_owned());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read text from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_owned())
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<PluginConfig> {
    let api_key = resolve_api_key(args.api_key, ENV_GEMINI_API_KEY, env)?.with_context(|| {
        format!("an API key is required: pass --api-key or set {ENV_GEMINI_API_KEY}")
    })?;

    Ok(PluginConfig {
        api_key: Some(api_key.expose().to_owned()),
        model: Some(resolve_string_with_default(
            args.model,
            ENV_GEMINI_MODEL,
            env,
            DEFAULT_MODEL,
        )),
        enable_thinking: Some(args.enable_thinking.to_string()),
        temperature: Some(args.temperature),
        max_output_tokens: Some(args.max_output_tokens),
        base_url: resolve_optional_string(args.base_url, ENV_GEMINI_BASE_URL, env),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemini_translate_core::config::MapEnv;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["gemini-translate"];
        argv.extend_from_slice(extra);
        argv.push("hello");
        Args::parse_from(argv)
    }

    #[test]
    fn flags_take_precedence_over_env() {
        let env = MapEnv::default()
            .with_var(ENV_GEMINI_API_KEY, "env-key")
            .with_var(ENV_GEMINI_MODEL, "env-model");
        let cfg = build_config(
            parse(&["--api-key", "cli-key", "--model", "cli-model"]),
            &env,
        )
        .expect("config");
        assert_eq!(cfg.api_key.as_deref(), Some("cli-key"));
        assert_eq!(cfg.model.as_deref(), Some("cli-model"));
    }

    #[test]
    fn env_fills_in_missing_flags() {
        let env = MapEnv::default()
            .with_var(ENV_GEMINI_API_KEY, "env-key")
            .with_var(ENV_GEMINI_BASE_URL, "http://localhost:9000");
        let cfg = build_config(parse(&[]), &env).expect("config");
        assert_eq!(cfg.api_key.as_deref(), Some("env-key"));
        assert_eq!(cfg.model.as_deref(), Some(DEFAULT_MODEL));
        assert_eq!(cfg.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cfg.enable_thinking.as_deref(), Some("false"));
        assert_eq!(cfg.temperature.as_deref(), Some(DEFAULT_TEMPERATURE));
        assert_eq!(cfg.max_output_tokens.as_deref(), Some(DEFAULT_MAX_OUTPUT_TOKENS));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = build_config(parse(&[]), &MapEnv::default()).unwrap_err();
        assert!(err.to_string().contains(ENV_GEMINI_API_KEY));
    }

    #[test]
    fn thinking_flag_is_forwarded() {
        let cfg = build_config(
            parse(&["--api-key", "k", "--enable-thinking"]),
            &MapEnv::default(),
        )
        .expect("config");
        assert_eq!(cfg.enable_thinking.as_deref(), Some("true"));
    }

    #[test]
    fn literal_text_is_used_as_is() {
        assert_eq!(read_text("Bonjour").unwrap(), "Bonjour");
    }
}
