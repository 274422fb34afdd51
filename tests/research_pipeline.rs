mod common;

use common::{FakePokeApi, FakeWeb, ScriptedLlm, analysis, clarification, services};
use pokedex_research::config::Config;
use pokedex_research::llm::LlmError;
use pokedex_research::research::clarify::ClarifyStage;
use pokedex_research::research::gather::GatherStage;
use pokedex_research::research::stage::ResearchStage;
use pokedex_research::research::{
    DataKeys, ResearchContext, ResearchOrchestrator, ResearchStepType,
};
use std::sync::Arc;

fn pikachu_sources() -> (FakePokeApi, FakeWeb) {
    let structured = FakePokeApi::default()
        .with_pokemon("pikachu", &["electric"])
        .with_description("pikachu", "It stores electricity in its cheeks.")
        .with_chain("pikachu", &["pichu", "pikachu", "raichu"]);
    let web = FakeWeb::default().with_results(
        "pikachu",
        &[
            "https://bulbapedia.test/Pikachu",
            "https://serebii.test/pikachu",
        ],
    );
    (structured, web)
}

#[tokio::test]
async fn test_full_pipeline_for_single_pokemon() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&["pikachu"]),
        analysis(0.85),
        Ok("Pikachu is a reliable electric type.".to_string()),
    ]));
    let (structured, web) = pikachu_sources();
    let orchestrator = ResearchOrchestrator::new(services(llm.clone(), structured, web));

    let report = orchestrator.conduct_research("Is Pikachu any good?").await;

    assert_eq!(report.query, "Is Pikachu any good?");
    assert_eq!(report.executive_summary, "Pikachu is a reliable electric type.");
    assert_eq!(report.confidence_score, 0.85);
    assert_eq!(report.recommendations, vec!["Teach Thunderbolt"]);
    assert_eq!(report.limitations, vec!["Limited competitive data"]);

    let step_types: Vec<_> = report.research_steps.iter().map(|s| s.step_type).collect();
    assert_eq!(
        step_types,
        vec![
            ResearchStepType::Clarification,
            ResearchStepType::PokeapiQuery,
            ResearchStepType::WebSearch,
            ResearchStepType::Analysis,
        ]
    );
    assert!(report.research_steps.iter().all(|s| s.success));

    let pokemon = &report.detailed_findings[&DataKeys::pokemon("pikachu")];
    assert_eq!(pokemon["description"], "It stores electricity in its cheeks.");
    assert_eq!(
        pokemon["evolution_chain"],
        serde_json::json!(["pichu", "pikachu", "raichu"])
    );
    let web_data = &report.detailed_findings[&DataKeys::web_data("pikachu")];
    assert_eq!(web_data["web_results"].as_array().unwrap().len(), 2);
    assert_eq!(web_data["training_tips"][0], "Train pikachu early");
    assert!(report.detailed_findings.contains_key(DataKeys::ANALYSIS));

    assert_eq!(
        report.sources,
        vec![
            "https://pokeapi.test/api/v2/pokemon/pikachu",
            "https://bulbapedia.test/Pikachu",
            "https://serebii.test/pikachu",
        ]
    );

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 3);
    assert_eq!(prompts[0].1, "Is Pikachu any good?");
    assert!(prompts[1].1.contains("answer the question"));
    assert!(prompts[1].1.contains("\"pokemon_pikachu\""));
    assert!(prompts[2].1.contains("4 steps completed"));
}

#[tokio::test]
async fn test_gather_records_one_successful_step_per_key() {
    let llm = Arc::new(ScriptedLlm::new(vec![clarification(&["pikachu"])]));
    let (structured, web) = pikachu_sources();
    let services = services(llm, structured, web);
    let mut context = ResearchContext::new("Tell me about Pikachu");

    ClarifyStage.execute(&services, &mut context).await;
    GatherStage.execute(&services, &mut context).await;

    assert!(context.has_data(&DataKeys::pokemon("pikachu")));
    assert!(context.has_data(&DataKeys::web_data("pikachu")));

    let structured_steps: Vec<_> = context
        .research_steps()
        .iter()
        .filter(|s| s.step_type == ResearchStepType::PokeapiQuery)
        .collect();
    assert_eq!(structured_steps.len(), 1);
    assert!(structured_steps[0].success);
    assert_eq!(
        structured_steps[0].description,
        "Retrieved comprehensive data for pikachu from PokeAPI"
    );

    let web_steps: Vec<_> = context
        .research_steps()
        .iter()
        .filter(|s| s.step_type == ResearchStepType::WebSearch)
        .collect();
    assert_eq!(web_steps.len(), 1);
    assert!(web_steps[0].success);
    assert_eq!(web_steps[0].sources.len(), 2);
}

#[tokio::test]
async fn test_clarification_failure_records_single_failed_step() {
    let llm = Arc::new(ScriptedLlm::new(vec![Err(LlmError::Transport(
        "connection refused".to_string(),
    ))]));
    let services = services(llm, FakePokeApi::default(), FakeWeb::default());
    let mut context = ResearchContext::new("Tell me about Pikachu");

    ClarifyStage.execute(&services, &mut context).await;

    assert_eq!(context.research_steps().len(), 1);
    let step = &context.research_steps()[0];
    assert!(!step.success);
    assert!(
        step.error_message
            .as_deref()
            .unwrap()
            .contains("connection refused")
    );
    assert!(context.clarified_goals().is_empty());
    assert!(context.pokemon_to_research().is_empty());
}

#[tokio::test]
async fn test_pipeline_never_fails_when_llm_is_down() {
    let llm = Arc::new(ScriptedLlm::new(Vec::new()));
    let orchestrator =
        ResearchOrchestrator::new(services(llm, FakePokeApi::default(), FakeWeb::default()));

    let report = orchestrator.conduct_research("Tell me about Pikachu").await;

    assert_eq!(report.query, "Tell me about Pikachu");
    assert_eq!(report.executive_summary, "Error generating report");
    assert_eq!(report.confidence_score, 0.0);

    let first = &report.research_steps[0];
    assert_eq!(first.step_type, ResearchStepType::Clarification);
    assert!(!first.success);
    assert!(first.error_message.as_deref().unwrap().contains("script exhausted"));

    // 分析失败同样留下记录
    assert_eq!(report.research_steps.len(), 2);
    assert_eq!(report.research_steps[1].step_type, ResearchStepType::Analysis);
    assert!(!report.research_steps[1].success);
}

#[tokio::test]
async fn test_entity_failures_do_not_abort_the_loop() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&["missingno", "eevee", "pikachu"]),
        analysis(0.6),
        Ok("summary".to_string()),
    ]));
    let structured = FakePokeApi::default()
        .with_pokemon("pikachu", &["electric"])
        .failing_on("eevee");
    let web = FakeWeb::default()
        .with_results("pikachu", &["https://bulbapedia.test/Pikachu"])
        .failing_on("missingno");
    let orchestrator = ResearchOrchestrator::new(services(llm, structured, web));

    let report = orchestrator.conduct_research("Compare these three").await;

    let outcomes: Vec<_> = report.research_steps[1..7]
        .iter()
        .map(|s| (s.description.as_str(), s.success))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("Failed to retrieve data for missingno", false),
            ("Failed to gather web data for missingno", false),
            ("Failed to retrieve data for eevee", false),
            ("Gathered additional information about eevee from web sources", true),
            ("Retrieved comprehensive data for pikachu from PokeAPI", true),
            ("Gathered additional information about pikachu from web sources", true),
        ]
    );

    assert_eq!(
        report.research_steps[1].error_message.as_deref(),
        Some("no data found for missingno")
    );
    assert!(
        report.research_steps[3]
            .error_message
            .as_deref()
            .unwrap()
            .contains("connection reset for eevee")
    );
    assert!(!report.detailed_findings.contains_key("pokemon_missingno"));
    assert!(!report.detailed_findings.contains_key("pokemon_eevee"));
    assert!(report.detailed_findings.contains_key("web_data_eevee"));
    assert!(report.detailed_findings.contains_key("pokemon_pikachu"));
}

#[tokio::test]
async fn test_parallel_fan_out_keeps_list_order() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&["snorlax", "pikachu", "eevee"]),
        analysis(0.9),
        Ok("summary".to_string()),
    ]));
    let structured = FakePokeApi::default()
        .with_pokemon("snorlax", &["normal"])
        .with_pokemon("pikachu", &["electric"])
        .with_pokemon("eevee", &["normal"])
        .delayed("snorlax", 60)
        .delayed("pikachu", 30);
    let mut config = Config::default();
    config.research.max_parallels = 3;
    let orchestrator = ResearchOrchestrator::new(common::services_with_config(
        config,
        llm,
        structured,
        FakeWeb::default(),
    ));

    let report = orchestrator.conduct_research("Which of these is best?").await;

    let descriptions: Vec<_> = report
        .research_steps
        .iter()
        .filter(|s| s.step_type == ResearchStepType::PokeapiQuery)
        .map(|s| s.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "Retrieved comprehensive data for snorlax from PokeAPI",
            "Retrieved comprehensive data for pikachu from PokeAPI",
            "Retrieved comprehensive data for eevee from PokeAPI",
        ]
    );
}

#[tokio::test]
async fn test_sources_are_deduplicated() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&["pikachu", "raichu"]),
        analysis(0.8),
        Ok("summary".to_string()),
    ]));
    let structured = FakePokeApi::default()
        .with_pokemon("pikachu", &["electric"])
        .with_pokemon("raichu", &["electric"]);
    let web = FakeWeb::default()
        .with_results("pikachu", &["https://bulbapedia.test/Electric", "https://a.test"])
        .with_results("raichu", &["https://bulbapedia.test/Electric", "https://a.test"]);
    let orchestrator = ResearchOrchestrator::new(services(llm, structured, web));

    let report = orchestrator.conduct_research("Pikachu or Raichu?").await;

    let mut unique = report.sources.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), report.sources.len());
    assert_eq!(report.sources.len(), 4);
}

#[tokio::test]
async fn test_executive_summary_truncation() {
    let long_narrative = "x".repeat(800);
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&[]),
        analysis(0.8),
        Ok(long_narrative),
    ]));
    let orchestrator =
        ResearchOrchestrator::new(services(llm, FakePokeApi::default(), FakeWeb::default()));

    let report = orchestrator.conduct_research("Tell me something").await;

    assert!(report.executive_summary.ends_with("..."));
    assert!(report.executive_summary.chars().count() <= 503);

    let exact = "y".repeat(500);
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&[]),
        analysis(0.8),
        Ok(exact.clone()),
    ]));
    let orchestrator =
        ResearchOrchestrator::new(services(llm, FakePokeApi::default(), FakeWeb::default()));

    let report = orchestrator.conduct_research("Tell me something").await;
    assert_eq!(report.executive_summary, exact);
}

#[tokio::test]
async fn test_confidence_defaults_without_analysis() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&[]),
        Ok("not json at all".to_string()),
        Ok("summary".to_string()),
    ]));
    let orchestrator =
        ResearchOrchestrator::new(services(llm, FakePokeApi::default(), FakeWeb::default()));

    let report = orchestrator.conduct_research("Tell me something").await;

    assert!(!report.detailed_findings.contains_key(DataKeys::ANALYSIS));
    assert_eq!(report.confidence_score, 0.7);
    assert!(report.recommendations.is_empty());

    let analysis_step = report.research_steps.last().unwrap();
    assert_eq!(analysis_step.step_type, ResearchStepType::Analysis);
    assert!(!analysis_step.success);
}

#[tokio::test]
async fn test_team_keyword_wins_over_sea() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&[]),
        analysis(0.8),
        Ok("summary".to_string()),
    ]));
    let structured = FakePokeApi::default()
        .with_category("water", &["lapras"])
        .with_category("bug", &["scizor"]);
    let orchestrator = ResearchOrchestrator::new(services(llm, structured, FakeWeb::default()));

    let report = orchestrator
        .conduct_research("Build a team of Pokemon that live by the sea")
        .await;

    assert!(report.detailed_findings.contains_key(DataKeys::TEAM_RESEARCH));
    assert!(!report.detailed_findings.contains_key(DataKeys::TRAINING_RESEARCH));
    assert!(!report.detailed_findings.contains_key(DataKeys::UNIQUE_POKEMON));

    let team = &report.detailed_findings[DataKeys::TEAM_RESEARCH];
    assert_eq!(team["available_types"], serde_json::json!(["bug", "water"]));
    assert_eq!(team["team_strategies"].as_array().unwrap().len(), 6);
    assert_eq!(
        team["type_advantages"]["water"],
        serde_json::json!(["fire", "ground", "rock"])
    );

    let auxiliary_steps = report
        .research_steps
        .iter()
        .filter(|s| s.step_type == ResearchStepType::Analysis)
        .count();
    // 队伍研究一次，分析阶段一次
    assert_eq!(auxiliary_steps, 2);
}

#[tokio::test]
async fn test_training_research_collects_beginner_pokemon() {
    let llm = Arc::new(ScriptedLlm::new(vec![clarification(&[])]));
    let structured = FakePokeApi::default()
        .with_pokemon("pikachu", &["electric"])
        .with_pokemon("charmander", &["fire"])
        .with_chain("charmander", &["charmander", "charmeleon", "charizard"]);
    let services = services(llm, structured, FakeWeb::default());
    let mut context = ResearchContext::new("What is an easy Pokemon to train?");

    ClarifyStage.execute(&services, &mut context).await;
    GatherStage.execute(&services, &mut context).await;

    let training = context.get(DataKeys::TRAINING_RESEARCH).unwrap();
    assert_eq!(training.as_object().unwrap().len(), 2);
    assert_eq!(training["pikachu"]["base_exp"], 112);
    assert_eq!(
        training["charmander"]["evolution_chain"],
        serde_json::json!(["charmander", "charmeleon", "charizard"])
    );

    let step = context.research_steps().last().unwrap();
    assert_eq!(step.step_type, ResearchStepType::Analysis);
    assert!(step.success);
}

#[tokio::test]
async fn test_unique_research_only_searches_mentioned_criteria() {
    let llm = Arc::new(ScriptedLlm::new(vec![clarification(&[])]));
    let many: Vec<String> = (0..15).map(|i| format!("mon{}", i)).collect();
    let many: Vec<&str> = many.iter().map(String::as_str).collect();
    let structured = FakePokeApi::default()
        .with_category("water", &many)
        .with_category("legendary", &["lugia"]);
    let services = services(llm, structured, FakeWeb::default());
    let mut context = ResearchContext::new("Find a unique water Pokemon that lives by the sea");

    ClarifyStage.execute(&services, &mut context).await;
    GatherStage.execute(&services, &mut context).await;

    let unique = context.get(DataKeys::UNIQUE_POKEMON).unwrap();
    let criteria: Vec<_> = unique.as_object().unwrap().keys().cloned().collect();
    assert_eq!(criteria, vec!["water"]);
    assert_eq!(unique["water"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_no_auxiliary_trigger_adds_no_step() {
    let llm = Arc::new(ScriptedLlm::new(vec![clarification(&[])]));
    let services = services(llm, FakePokeApi::default(), FakeWeb::default());
    let mut context = ResearchContext::new("How tall is Snorlax?");

    ClarifyStage.execute(&services, &mut context).await;
    GatherStage.execute(&services, &mut context).await;

    assert_eq!(context.research_steps().len(), 1);
}

#[tokio::test]
async fn test_failed_team_research_records_failed_step() {
    let llm = Arc::new(ScriptedLlm::new(vec![clarification(&[])]));
    let structured = FakePokeApi::default()
        .with_category("water", &["lapras"])
        .failing_categories();
    let services = services(llm, structured, FakeWeb::default());
    let mut context = ResearchContext::new("Build a team of Pokemon");

    ClarifyStage.execute(&services, &mut context).await;
    GatherStage.execute(&services, &mut context).await;

    let analysis_steps: Vec<_> = context
        .research_steps()
        .iter()
        .filter(|s| s.step_type == ResearchStepType::Analysis)
        .collect();
    assert_eq!(analysis_steps.len(), 1);

    let step = analysis_steps[0];
    assert!(!step.success);
    assert_eq!(step.description, "Failed to research team composition");
    assert!(
        step.error_message
            .as_deref()
            .is_some_and(|m| m.contains("category index unavailable"))
    );
    assert!(context.get(DataKeys::TEAM_RESEARCH).is_none());
}

#[tokio::test]
async fn test_single_parallel_lookups_run_in_sequence() {
    let events = common::EventLog::default();
    let llm = Arc::new(ScriptedLlm::new(vec![clarification(&["pikachu", "eevee"])]));
    let structured = FakePokeApi::default()
        .with_pokemon("pikachu", &["electric"])
        .with_pokemon("eevee", &["normal"])
        .delayed("pikachu", 30)
        .recording(&events);
    let web = FakeWeb::default().recording(&events);
    let mut config = Config::default();
    config.research.max_parallels = 1;
    let services = common::services_with_config(config, llm, structured, web);
    let mut context = ResearchContext::new("Compare Pikachu and Eevee");

    ClarifyStage.execute(&services, &mut context).await;
    GatherStage.execute(&services, &mut context).await;

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "structured start pikachu",
            "structured end pikachu",
            "web pikachu",
            "structured start eevee",
            "structured end eevee",
            "web eevee",
        ]
    );
}

#[tokio::test]
async fn test_degraded_report_keeps_prior_steps() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        clarification(&["pikachu"]),
        analysis(0.85),
        Err(LlmError::Timeout(60)),
    ]));
    let (structured, web) = pikachu_sources();
    let orchestrator = ResearchOrchestrator::new(services(llm, structured, web));

    let report = orchestrator.conduct_research("Is Pikachu any good?").await;

    assert_eq!(report.confidence_score, 0.0);
    assert_eq!(report.limitations, vec!["Failed to generate complete report"]);
    assert!(report.recommendations.is_empty());
    assert!(report.sources.is_empty());
    assert_eq!(report.research_steps.len(), 4);
    assert!(report.research_steps.iter().all(|s| s.success));
    assert!(report.detailed_findings.contains_key("pokemon_pikachu"));
}
