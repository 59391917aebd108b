//! Prompt text sent to the generative model.

/// One stage of a study pathway
pub(crate) fn pathway_stage(topic: &str, grade: &str, stage_number: u32, stage_count: u32) -> String {
    format!(
        "Create a single stage for a study pathway on the topic \"{topic}\" at the \"{grade}\" level.\n\
         This should be stage number {stage_number} of a {stage_count}-stage pathway.\n\
         Use <b> to bold any subtopics or topics.\n\
         Use the following structure:\n\
         <h2>Stage {stage_number}: [Stage Name]</h2>\n\
         <h3>Foundational Skills</h3>\n\
         <ul><li>[Skill 1]</li><li>[Skill 2]</li></ul>\n\
         <h3>Core Topics</h3>\n\
         <ul><li>[Topic 1]</li><li>[Topic 2]</li></ul>\n\
         <h3>Learning Activities</h3>\n\
         <ul><li>[Activity 1]</li><li>[Activity 2]</li></ul>\n\
         Keep the response under 500 characters."
    )
}

pub(crate) fn ai_notes(topic: &str, grade: &str, stage: &str) -> String {
    format!(
        "Generate concise and informative study notes for the topic \"{topic}\" specifically \
         focusing on \"{stage}\" at the \"{grade}\" level.\n\
         Cover the foundational skills, core topics and learning activities of this stage, \
         with key concepts, definitions and important points.\n\
         Format the notes as HTML: <h3> for subtopics, <p> for paragraphs, <ul> or <ol> for lists, \
         and <b> to highlight important terms.\n\
         Limit the response to around 500 words."
    )
}

pub(crate) fn ai_questions(topic: &str, grade: &str) -> String {
    format!(
        "Generate a set of 5 thought-provoking questions about \"{topic}\" suitable for \
         \"{grade}\" level students.\n\
         Include a mix of factual recall and analytical questions.\n\
         Format each question as an HTML list item (<li>)."
    )
}

/// Short introduction placed above a list of videos or books
pub(crate) fn content_intro(topic: &str, grade: &str, stage: &str, resource: &str) -> String {
    format!(
        "Generate a brief introduction (2-3 sentences) for {resource} resources about \"{topic}\" \
         for {grade} level students, focusing on the stage: \"{stage}\".\n\
         Explain why these resources are helpful and what students can expect to learn.\n\
         Answer with plain text only."
    )
}

/// Topic and level inference for an uploaded document
pub(crate) fn document_insights(text: &str) -> String {
    format!(
        "Read the following study material and identify what it teaches.\n\
         Answer with a single JSON object and nothing else, using exactly these keys:\n\
         {{\"topic\": string, \"grade\": string, \"subtopics\": [string], \"mainConcepts\": [string]}}\n\
         \"grade\" is the academic level the material targets, e.g. \"Middle School\" or \"Undergraduate\".\n\
         Material:\n\
         {text}"
    )
}
