use codeflow_chunker::Chunk;

/// System prompt for the fallback diagram backend
pub const SYSTEM_PROMPT: &str = r#"You are an expert software architect specializing in sequence diagram generation. Your task is to analyze code and create a precise PlantUML sequence diagram.

CRITICAL REQUIREMENTS:
1. ALWAYS output valid PlantUML code ONLY
2. Start with @startuml and end with @enduml
3. Include ALL key interactions between components
4. Show proper activation/deactivation of participants
5. Include error handling flows where relevant
6. Use proper PlantUML syntax for async operations
7. Keep the diagram focused and readable
8. Use proper naming conventions
9. Include clear participant labels

REQUIRED OUTPUT FORMAT:
@startuml
' Configuration
skinparam style strictuml
skinparam sequenceMessageAlign center
skinparam maxmessagesize 160

' Participants
participant "ComponentA" as A
participant "ComponentB" as B

' Interactions
A -> B: methodCall()
activate B
B --> A: response
deactivate B
@enduml"#;

/// Build the user prompt from the chunk set
pub fn user_prompt(chunks: &[Chunk]) -> String {
    let mut prompt = String::from(
        "Analyze the following code and generate a sequence diagram showing the main interactions:\n",
    );

    for chunk in chunks {
        prompt.push_str(&format!("\n=== {} ===\n{}\n", chunk.path, chunk.content));
    }

    prompt.push_str(
        "\nRequirements:\n\
         1. Focus on the main workflow and key interactions\n\
         2. Show component relationships clearly\n\
         3. Include error handling where present\n\
         4. Use proper PlantUML syntax\n\
         5. Output ONLY the PlantUML code\n\
         6. Keep the diagram focused and readable\n\
         7. Show async operations correctly\n\
         8. Include proper activation/deactivation",
    );

    prompt
}
