//! Interviewer personas. Purely presentational: the persona labels the
//! session and is stored on the record, but never alters question generation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Male,
    Female,
    #[default]
    Default,
}

/// Display metadata for a persona, shown beside the session video panel.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaProfile {
    pub id: Persona,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub tips: [&'static str; 3],
}

impl Persona {
    pub fn all() -> [Persona; 3] {
        [Persona::Male, Persona::Female, Persona::Default]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Male => "male",
            Persona::Female => "female",
            Persona::Default => "default",
        }
    }

    pub fn profile(&self) -> PersonaProfile {
        match self {
            Persona::Male => PersonaProfile {
                id: *self,
                name: "Alex Johnson",
                title: "Senior Tech Interviewer",
                description: "Formal and technical, focuses on depth of knowledge",
                tips: [
                    "Prefers detailed technical answers",
                    "Looks for problem-solving approaches",
                    "Values clear explanations",
                ],
            },
            Persona::Female => PersonaProfile {
                id: *self,
                name: "Sarah Chen",
                title: "HR & Behavioral Specialist",
                description: "Friendly but thorough, emphasizes communication skills",
                tips: [
                    "Looks for STAR method responses",
                    "Values emotional intelligence",
                    "Prefers concise answers",
                ],
            },
            Persona::Default => PersonaProfile {
                id: *self,
                name: "Interviewer",
                title: "Professional Interviewer",
                description: "Standard interview experience",
                tips: [
                    "Be clear and professional",
                    "Structure your answers",
                    "Provide relevant examples",
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Persona::Male).unwrap(), "\"male\"");
        let p: Persona = serde_json::from_str("\"female\"").unwrap();
        assert_eq!(p, Persona::Female);
    }

    #[test]
    fn test_persona_default_is_default() {
        assert_eq!(Persona::default(), Persona::Default);
    }

    #[test]
    fn test_profiles_have_names() {
        for persona in Persona::all() {
            assert!(!persona.profile().name.is_empty());
        }
    }
}
