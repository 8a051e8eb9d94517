/*
[INPUT]:  TaskWizard, available templates, user input via CLI
[OUTPUT]: Created or updated Task, or None when the user cancels
[POS]:    CLI interactive flow - drives the wizard one step at a time
[UPDATE]: 2026-09-27 Prompt defaults come from the draft so blocked steps keep input
[UPDATE]: 2026-10-16 Each Run Now takes its own interrupt token
*/

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};

use searchwatch_adapter::{
    NotificationChannel, NotifyBehavior, PollConfig, SearchwatchClient, Task, TaskTemplate,
};
use searchwatch_console::preview::{self, PreviewOutcome};
use searchwatch_console::render;
use searchwatch_console::schedule::{self, PRESETS};
use searchwatch_console::wizard::{FieldErrors, TaskWizard, WizardError, WizardMode, WizardStep};

enum Navigation {
    Forward,
    Back,
    Cancel,
}

pub async fn run_wizard(
    client: &SearchwatchClient,
    mut wizard: TaskWizard,
    templates: &[TaskTemplate],
    poll: PollConfig,
) -> Result<Option<Task>> {
    let theme = ColorfulTheme::default();
    let heading = match wizard.mode() {
        WizardMode::Create => "Create a monitoring task".to_string(),
        WizardMode::Edit { task_id } => format!("Edit task {task_id}"),
    };
    println!("{}", style(heading).bold().cyan());

    loop {
        let (position, total) = wizard.progress();
        println!(
            "\n{} {}",
            style(format!("Step {position}/{total}")).dim(),
            style(wizard.step().title()).bold()
        );

        match wizard.step() {
            WizardStep::TemplateSelect => prompt_template(&mut wizard, templates, &theme)?,
            WizardStep::Query => prompt_query(&mut wizard, &theme)?,
            WizardStep::Preview => {
                prompt_preview(&mut wizard, client, poll, &theme).await?
            }
            WizardStep::Schedule => prompt_schedule(&mut wizard, &theme)?,
            WizardStep::NotifyBehavior => prompt_notify(&mut wizard, &theme)?,
        }

        match prompt_navigation(&wizard, &theme)? {
            Navigation::Cancel => {
                wizard.cancel();
                println!("{}", style("Cancelled.").yellow());
                return Ok(None);
            }
            Navigation::Back => {
                wizard.back();
            }
            Navigation::Forward if wizard.is_final_step() => match wizard.submit(client).await {
                Ok(task) => return Ok(Some(task)),
                Err(WizardError::Invalid { errors, .. }) => print_errors(&errors),
                Err(err) => println!("{} {err}", style("Could not save:").red()),
            },
            Navigation::Forward => {
                if let Err(WizardError::Invalid { errors, .. }) = wizard.advance() {
                    print_errors(&errors);
                }
            }
        }
    }
}

fn prompt_navigation(wizard: &TaskWizard, theme: &ColorfulTheme) -> Result<Navigation> {
    let forward = if wizard.is_final_step() {
        "Save"
    } else {
        "Continue"
    };
    let mut items = vec![forward];
    if !wizard.is_first_step() {
        items.push("Back");
    }
    items.push("Cancel");

    let selection = Select::with_theme(theme)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(match items[selection] {
        "Back" => Navigation::Back,
        "Cancel" => Navigation::Cancel,
        _ => Navigation::Forward,
    })
}

fn print_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        println!("  {} {}", style(format!("{field}:")).red(), message);
    }
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str, current: &str) -> Result<String> {
    let value: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

fn prompt_optional(theme: &ColorfulTheme, prompt: &str, current: Option<&str>) -> Result<Option<String>> {
    let value = prompt_text(theme, prompt, current.unwrap_or_default())?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn prompt_template(
    wizard: &mut TaskWizard,
    templates: &[TaskTemplate],
    theme: &ColorfulTheme,
) -> Result<()> {
    if templates.is_empty() {
        println!("{}", style("No templates available; starting from scratch.").dim());
        return Ok(());
    }

    let mut items = vec!["Start from scratch".to_string()];
    items.extend(templates.iter().map(|template| match &template.category {
        Some(category) => format!("[{category}] {}", template.name),
        None => template.name.clone(),
    }));
    let current = wizard
        .draft()
        .template_id
        .as_deref()
        .and_then(|id| templates.iter().position(|template| template.id == id))
        .map_or(0, |index| index + 1);

    let selection = Select::with_theme(theme)
        .with_prompt("Template")
        .items(&items)
        .default(current)
        .interact()?;
    if let Some(template) = selection.checked_sub(1).and_then(|index| templates.get(index)) {
        wizard.apply_template(template)?;
    }
    Ok(())
}

fn prompt_query(wizard: &mut TaskWizard, theme: &ColorfulTheme) -> Result<()> {
    let name = prompt_text(theme, "Task name", &wizard.draft().name)?;
    wizard.set_name(name);
    let query = prompt_text(theme, "What should be searched?", &wizard.draft().search_query)?;
    wizard.set_search_query(query);
    Ok(())
}

async fn prompt_preview(
    wizard: &mut TaskWizard,
    client: &SearchwatchClient,
    poll: PollConfig,
    theme: &ColorfulTheme,
) -> Result<()> {
    let condition = prompt_text(
        theme,
        "Notify me when",
        &wizard.draft().condition_description,
    )?;
    wizard.set_condition(condition);

    if let Some(execution) = wizard.preview() {
        println!("{}", render::execution_detail(execution));
    }

    let task_id = match wizard.mode() {
        WizardMode::Edit { task_id } => task_id.clone(),
        WizardMode::Create => {
            println!(
                "{}",
                style("Run Now is available once the task is saved (searchwatch run <id>).").dim()
            );
            return Ok(());
        }
    };

    let run = Confirm::with_theme(theme)
        .with_prompt("Run the saved task now to preview the result?")
        .default(false)
        .interact()?;
    if !run {
        return Ok(());
    }

    println!("{}", style("Running (notifications suppressed)...").dim());
    let cancel = preview::interrupt_token();
    let outcome = preview::run_preview(client, &task_id, poll, &cancel).await;
    println!("{}", render::preview_outcome(&outcome));
    if let PreviewOutcome::Completed(execution) = outcome {
        wizard.record_preview(execution);
    }
    Ok(())
}

fn prompt_schedule(wizard: &mut TaskWizard, theme: &ColorfulTheme) -> Result<()> {
    let current = wizard.draft().schedule.clone();
    let mut items: Vec<String> = PRESETS
        .iter()
        .map(|preset| format!("{} ({})", preset.label, preset.cron))
        .collect();
    items.push("Custom cron expression".to_string());
    let default = PRESETS
        .iter()
        .position(|preset| preset.cron == current.trim())
        .unwrap_or(PRESETS.len());

    let selection = Select::with_theme(theme)
        .with_prompt("How often should it run?")
        .items(&items)
        .default(default)
        .interact()?;

    let cron = match PRESETS.get(selection) {
        Some(preset) => preset.cron.to_string(),
        None => prompt_text(theme, "Cron (minute hour day month weekday)", &current)?,
    };
    println!("  {}", style(schedule::describe(&cron)).dim());
    wizard.set_schedule(cron);
    Ok(())
}

fn prompt_notify(wizard: &mut TaskWizard, theme: &ColorfulTheme) -> Result<()> {
    let draft = wizard.draft().clone();

    let behaviors: Vec<String> = NotifyBehavior::ALL
        .iter()
        .map(|behavior| format!("{} - {}", behavior, behavior.description()))
        .collect();
    let current = NotifyBehavior::ALL
        .iter()
        .position(|behavior| *behavior == draft.notify_behavior)
        .unwrap_or(0);
    let selection = Select::with_theme(theme)
        .with_prompt("Notify behavior")
        .items(&behaviors)
        .default(current)
        .interact()?;
    wizard.set_notify_behavior(NotifyBehavior::ALL[selection]);

    let checked: Vec<bool> = NotificationChannel::ALL
        .iter()
        .map(|channel| draft.notification_channels.contains(channel))
        .collect();
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt("Channels (space to toggle)")
        .items(&NotificationChannel::ALL)
        .defaults(&checked)
        .interact()?;
    let channels: Vec<NotificationChannel> = chosen
        .into_iter()
        .map(|index| NotificationChannel::ALL[index])
        .collect();

    if channels.contains(&NotificationChannel::Email) {
        let email = prompt_optional(
            theme,
            "Email address (blank for account email)",
            draft.notification_email.as_deref(),
        )?;
        wizard.set_notification_email(email);
    }
    if channels.contains(&NotificationChannel::Webhook) {
        let url = prompt_optional(theme, "Webhook URL", draft.webhook_url.as_deref())?;
        wizard.set_webhook_url(url);
    }
    wizard.set_channels(channels);
    Ok(())
}
