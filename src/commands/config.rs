use crate::cli::ConfigCommand;
use crate::commands::Services;
use crate::config::ChatConfigPatch;
use crate::error::Result;
use colored::Colorize;

/// Handle config commands
pub async fn handle_config(services: &Services, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = services.config.get().await;
            println!();
            println!("{}", "Chat configuration:".bold());
            println!("  max_chats_in_drawer     {}", config.max_chats_in_drawer);
            println!("  max_chat_history        {}", config.max_chat_history);
            println!("  search_debounce_ms      {}", config.search_debounce_ms);
            println!("  auto_save_interval_ms   {}", config.auto_save_interval_ms);
            println!("  enable_search_indexing  {}", config.enable_search_indexing);
            println!();
        }
        ConfigCommand::Set {
            max_chats_in_drawer,
            max_chat_history,
            search_debounce_ms,
            auto_save_interval_ms,
            enable_search_indexing,
        } => {
            let patch = ChatConfigPatch {
                max_chats_in_drawer,
                max_chat_history,
                search_debounce_ms,
                auto_save_interval_ms,
                enable_search_indexing,
            };

            if patch.is_empty() {
                println!("{}", "Nothing to update; pass at least one --field.".yellow());
                return Ok(());
            }

            services.config.update(&patch).await?;
            println!("{}", "Configuration updated.".green());
        }
        ConfigCommand::Reset => {
            services.config.reset().await?;
            println!("{}", "Configuration reset to defaults.".green());
        }
    }

    Ok(())
}
