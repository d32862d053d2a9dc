use clap::Parser;
use searchdesk::app::actions::{collections, documents, keys, overrides, synonyms, system};
use searchdesk::app::render;
use searchdesk::config::cli::{
    CollectionsCommand, Command, DocumentsCommand, KeysCommand, OverridesCommand, SynonymsCommand,
};
use searchdesk::domain::model::{FieldDefinition, ImportReport, RowRecord};
use searchdesk::domain::schema::{Collection, Synonym};
use searchdesk::utils::error::ErrorSeverity;
use searchdesk::utils::message::{dispatch, Message};
use searchdesk::utils::{logger, validation::Validate};
use searchdesk::{
    BulkImportPipeline, CliConfig, ImportEngine, LocalStorage, Result, Settings, TypesenseClient,
};
use serde::de::DeserializeOwned;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger(settings.verbose);
    } else {
        logger::init_cli_logger(settings.verbose);
    }

    tracing::info!("Starting searchdesk CLI");
    tracing::debug!("Service: {}://{}:{}", settings.protocol, settings.host, settings.port);

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let outcome = match TypesenseClient::from_config(&settings) {
        Ok(client) => run(cli.command, &settings, &client).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(message) => {
            dispatch(&message);
            if message.is_error() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

/// `@path` 讀取檔案內容，其他值當作 JSON 本身
fn json_argument<T: DeserializeOwned>(argument: &str) -> Result<T> {
    let text = match argument.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => argument.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

fn json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn listed(count: usize, noun: &str) -> Message {
    Message::info(format!("{} {}", count, noun))
}

async fn run(command: Command, settings: &Settings, client: &TypesenseClient) -> Result<Message> {
    match command {
        Command::Health => Ok(system::check_health(client).await),
        Command::Metrics => {
            let metrics = system::metrics(client).await?;
            println!("{}", render::metrics(&metrics));
            Ok(listed(metrics.len(), "metrics"))
        }
        Command::Collections(command) => run_collections(command, client).await,
        Command::Documents(command) => run_documents(command, settings, client).await,
        Command::Synonyms(command) => run_synonyms(command, client).await,
        Command::Overrides(command) => run_overrides(command, client).await,
        Command::Keys(command) => run_keys(command, client).await,
    }
}

async fn run_collections(command: CollectionsCommand, client: &TypesenseClient) -> Result<Message> {
    match command {
        CollectionsCommand::List => {
            let found = client.list_collections().await?;
            println!("{}", render::collections(&found));
            Ok(listed(found.len(), "collections"))
        }
        CollectionsCommand::Get { name } => {
            let collection = client.get_collection(&name).await?;
            println!("{}", render::collections(std::slice::from_ref(&collection)));
            println!();
            println!("{}", render::collection_fields(&collection));
            Ok(listed(collection.fields.len(), "fields"))
        }
        CollectionsCommand::Create { schema } => {
            let collection: Collection = json_file(&schema)?;
            Ok(collections::create_collection(client, &collection).await)
        }
        CollectionsCommand::Update { name, fields } => {
            let fields: Vec<FieldDefinition> = json_file(&fields)?;
            Ok(collections::update_collection(client, &name, &fields).await)
        }
        CollectionsCommand::Delete { name } => Ok(collections::delete_collection(client, &name).await),
        CollectionsCommand::Types => {
            println!("{}", render::field_types());
            Ok(Message::info("Use these values as a field's type"))
        }
    }
}

async fn run_documents(
    command: DocumentsCommand,
    settings: &Settings,
    client: &TypesenseClient,
) -> Result<Message> {
    match command {
        DocumentsCommand::Import {
            collection,
            file,
            dry_run,
        } => {
            let pipeline =
                BulkImportPipeline::new(LocalStorage::default(), settings.clone(), &collection, &file)?;
            let engine = ImportEngine::new(pipeline).dry_run(dry_run);
            let upload = documents::upload_bulk_documents(&engine).await;

            match &upload.report {
                Some(ImportReport::Rejected(failure)) if !failure.errors.is_empty() => {
                    println!("{}", render::validation_errors(failure));
                }
                Some(ImportReport::PartiallyFailed { failures, .. }) => {
                    println!("{}", render::import_failures(failures));
                }
                _ => {}
            }
            Ok(upload.message)
        }
        DocumentsCommand::Upsert {
            collection,
            document,
        } => {
            let values: RowRecord = json_argument(&document)?;
            Ok(documents::create_document(client, &collection, &values, settings.strict_types).await)
        }
        DocumentsCommand::Delete { collection, id } => {
            Ok(documents::delete_document(client, &collection, &id).await)
        }
        DocumentsCommand::Search {
            collection,
            q,
            query_by,
        } => {
            let options = documents::search_documents(client, &collection, &q, &query_by).await;
            for option in &options {
                println!("{}  {}", option.value, option.label);
            }
            Ok(listed(options.len(), "documents"))
        }
    }
}

async fn run_synonyms(command: SynonymsCommand, client: &TypesenseClient) -> Result<Message> {
    match command {
        SynonymsCommand::List { collection } => {
            let found = client.list_synonyms(&collection).await?;
            println!("{}", render::synonyms(&found));
            Ok(listed(found.len(), "synonyms"))
        }
        SynonymsCommand::Get { collection, id } => {
            let synonym = client.get_synonym(&collection, &id).await?;
            println!("{}", render::synonyms(std::slice::from_ref(&synonym)));
            Ok(listed(synonym.synonyms.len(), "synonyms"))
        }
        SynonymsCommand::Upsert(args) => {
            let synonym = Synonym {
                id: args.id,
                root: args.root,
                synonyms: args.synonyms,
                locale: args.locale,
                symbols_to_index: None,
            };
            Ok(synonyms::upsert_synonym(client, &args.collection, &synonym).await)
        }
        SynonymsCommand::Delete { collection, id } => {
            Ok(synonyms::delete_synonym(client, &collection, &id).await)
        }
    }
}

async fn run_overrides(command: OverridesCommand, client: &TypesenseClient) -> Result<Message> {
    match command {
        OverridesCommand::List { collection } => {
            let found = client.list_overrides(&collection).await?;
            println!("{}", render::overrides(&found));
            Ok(listed(found.len(), "overrides"))
        }
        OverridesCommand::Get { collection, id } => {
            let curation = client.get_override(&collection, &id).await?;
            println!("{}", serde_json::to_string_pretty(&curation)?);
            Ok(Message::info(format!("Override '{}'", id)))
        }
        OverridesCommand::Upsert { collection, form } => {
            let form: overrides::OverrideForm = json_argument(&form)?;
            Ok(overrides::upsert_override(client, &collection, form).await)
        }
        OverridesCommand::Delete { collection, id } => {
            Ok(overrides::delete_override(client, &collection, &id).await)
        }
    }
}

async fn run_keys(command: KeysCommand, client: &TypesenseClient) -> Result<Message> {
    match command {
        KeysCommand::List => {
            let found = client.list_keys().await?;
            println!("{}", render::api_keys(&found));
            Ok(listed(found.len(), "API keys"))
        }
        KeysCommand::Get { id } => {
            let key = client.get_key(id).await?;
            println!("{}", render::api_keys(std::slice::from_ref(&key)));
            Ok(listed(1, "API key"))
        }
        KeysCommand::Create {
            description,
            actions,
            collections,
            expires_at,
            autodelete,
        } => {
            let form = keys::ApiKeyForm {
                description,
                actions,
                collections,
                expires_at,
                autodelete,
            };
            match keys::create_api_key(client, form).await {
                Ok(key) => {
                    println!("{}", render::api_keys(std::slice::from_ref(&key)));
                    // 完整金鑰只會出現這一次
                    if let Some(value) = &key.value {
                        println!("Key: {}", value);
                    }
                    Ok(Message::success("API key successfully created"))
                }
                Err(message) => Ok(message),
            }
        }
        KeysCommand::Delete { id } => Ok(keys::delete_api_key(client, id).await),
        KeysCommand::Actions => {
            println!("{}", render::api_actions());
            Ok(Message::info("Pass actions to `keys create --actions`"))
        }
    }
}
