//! "How it works" panel: static reference snippets behind a toggle.
//!
//! Purely presentational. The panel holds one boolean and never talks to the
//! form or the upload flow.

/// One titled snippet shown when the panel is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplainerSection {
    pub title: &'static str,
    /// Syntax-highlighting hint for the snippet (`"typescript"`, `"python"`, …).
    pub language: &'static str,
    pub code: &'static str,
}

pub const SECTIONS: &[ExplainerSection] = &[
    ExplainerSection {
        title: "1. Define the form schema",
        language: "typescript",
        code: r#"const formSchema = z.object({
  firstName: z.string().min(1, 'First name is required'),
  lastName: z.string().min(1, 'Last name is required'),
  email: z.string().email('Invalid email address'),
  phone: z.string().min(1, 'Phone number is required'),
  income: z.number().min(0, 'Income must be a positive number'),
  expenses: z.number().min(0, 'Expenses must be a positive number'),
});

const jsonSchema = zodToJsonSchema(formSchema, { name: 'FormSchema' });"#,
    },
    ExplainerSection {
        title: "2. Upload the PDF with the schema",
        language: "typescript",
        code: r#"const formData = new FormData();
formData.append('file', file);
formData.append('schema', JSON.stringify(jsonSchema));

const response = await fetch(`${API_URL}/upload-pdf`, {
  method: 'POST',
  body: formData,
});
const data = await response.json();
Object.entries(data.result).forEach(([key, value]) => setValue(key, value));"#,
    },
    ExplainerSection {
        title: "3. Convert the PDF to an image",
        language: "python",
        code: r#"images = convert_from_path(pdf_path)
image_path = pdf_path.replace('.pdf', '.png')
images[0].save(image_path, 'PNG')"#,
    },
    ExplainerSection {
        title: "4. Ask the model for the fields as JSON",
        language: "python",
        code: r#"def process_image_with_anthropic(self, image_path):
    with open(image_path, 'rb') as image_file:
        response = self.anthropic.completions.create(
            model="claude-2",
            max_tokens_to_sample=300,
            prompt=f"{HUMAN_PROMPT}Here's an image of a form. Please extract "
                   f"the relevant information and return it as a JSON object.{AI_PROMPT}",
            image=image_file,
        )
    return response.completion"#,
    },
];

/// Collapsible panel state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplainerPanel {
    expanded: bool,
}

impl ExplainerPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip visibility; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The visible sections: all of them when expanded, none otherwise.
    pub fn sections(&self) -> &'static [ExplainerSection] {
        if self.expanded {
            SECTIONS
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_by_default() {
        let panel = ExplainerPanel::new();
        assert!(!panel.is_expanded());
        assert!(panel.sections().is_empty());
    }

    #[test]
    fn toggle_round_trip() {
        let mut panel = ExplainerPanel::new();
        assert!(panel.toggle());
        assert_eq!(panel.sections().len(), SECTIONS.len());
        assert!(!panel.toggle());
        assert!(panel.sections().is_empty());
    }

    #[test]
    fn schema_snippet_matches_field_messages() {
        let schema = crate::schema::FormSchema::financial_profile();
        for field in schema.fields() {
            assert!(
                SECTIONS[0].code.contains(&field.name),
                "snippet is missing {}",
                field.name
            );
        }
    }

    #[test]
    fn pipeline_snippets_follow_the_service() {
        assert!(SECTIONS[2].code.contains("convert_from_path"));
        assert!(SECTIONS[3].code.contains("completions.create"));
        assert!(SECTIONS[3].code.contains("return it as a JSON object"));
    }
}
