//! Summary prompt construction
//!
//! Builds the fixed system/user prompt pair for project summaries from
//! aggregated project data. The README is truncated to a fixed character
//! budget before inclusion, and presentation-only topics are filtered out
//! of the technology list.

use crate::ai::client::ChatMessage;
use crate::models::Repo;

/// Character budget for README content included in the prompt
const README_CHAR_BUDGET: usize = 2000;

/// Topics that describe the portfolio, not the project's technology
const NON_TECH_TOPICS: &[&str] = &["featured", "portfolio", "project", "personal"];

/// Project data handed to the summary generator
#[derive(Debug, Clone)]
pub struct ProjectSummaryInput {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub readme: Option<String>,
    pub stars: i64,
    pub forks: i64,
    pub open_issues: i64,
}

impl ProjectSummaryInput {
    /// Assemble the generator input from a repository snapshot and its README
    pub fn from_repo(repo: &Repo, readme: Option<&str>) -> Self {
        Self {
            name: repo.name.clone(),
            description: repo.description.clone(),
            language: repo.language.clone(),
            topics: extract_technologies(repo),
            readme: readme.map(String::from),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
        }
    }
}

/// Collect the technology list: repository topics plus the primary
/// language, minus presentation-only topics.
fn extract_technologies(repo: &Repo) -> Vec<String> {
    let mut technologies = repo.topics.clone();

    if let Some(language) = &repo.language {
        let lower = language.to_lowercase();
        if !technologies.iter().any(|t| t.to_lowercase() == lower) {
            technologies.push(language.clone());
        }
    }

    technologies
        .into_iter()
        .filter(|t| !NON_TECH_TOPICS.contains(&t.to_lowercase().as_str()))
        .collect()
}

/// Build the system+user message pair for a summary request
pub fn build_summary_messages(input: &ProjectSummaryInput) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(input)),
    ]
}

const SYSTEM_PROMPT: &str = "Tu es un rédacteur technique expert et passionné qui crée des résumés de projets captivants et amusants pour le portfolio d'un développeur.

Ta mission est de générer un résumé bref et accrocheur (2-3 phrases) qui met en avant :
- Le but principal et les fonctionnalités du projet de manière engageante
- Les technologies clés avec un ton enthousiaste
- Les caractéristiques notables ou réalisations impressionnantes

Adopte un ton professionnel mais décontracté, avec une pointe d'humour et d'enthousiasme. Rends ce projet irrésistible et mémorable ! Utilise des émojis avec parcimonie pour ajouter du dynamisme.";

fn user_prompt(input: &ProjectSummaryInput) -> String {
    let readme_section = match &input.readme {
        Some(readme) => {
            let truncated: String = readme.chars().take(README_CHAR_BUDGET).collect();
            let ellipsis = if readme.chars().count() > README_CHAR_BUDGET {
                "..."
            } else {
                ""
            };
            format!("**Contenu README:**\n{}{}", truncated, ellipsis)
        }
        None => "**Note:** Aucun fichier README disponible".to_string(),
    };

    format!(
        "Crée un résumé captivant et fun pour ce projet :\n\n\
         **Nom du Projet:** {}\n\
         **Description:** {}\n\
         **Langage Principal:** {}\n\
         **Technologies/Sujets:** {}\n\
         **Stats GitHub:** {} étoiles, {} forks, {} issues ouvertes\n\n\
         {}\n\n\
         Génère un résumé de 2-3 phrases en français qui soit à la fois professionnel, accrocheur et amusant - parfait pour un portfolio qui se démarque !",
        input.name,
        input.description.as_deref().unwrap_or("Aucune description fournie"),
        input.language.as_deref().unwrap_or("Non spécifié"),
        if input.topics.is_empty() {
            "Aucun spécifié".to_string()
        } else {
            input.topics.join(", ")
        },
        input.stars,
        input.forks,
        input.open_issues,
        readme_section,
    )
}
