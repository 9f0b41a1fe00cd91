//! One-page-per-screenful recipe card rendered with the PDF builtin fonts.
//!
//! The builtin Helvetica faces only cover the WinAnsi (Windows-1252) set.
//! Characters outside it, such as CJK text or emoji, are drawn as `?`.
//! Full Unicode output needs an embedded TTF font.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::error::PdfError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, Default)]
pub struct RecipeCard {
    pub title: String,
    pub cuisine: Option<String>,
    pub description: String,
    pub prep_duration: i32,
    pub cook_duration: i32,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub average_rating: Option<f64>,
}

pub fn render_recipe_card(card: &RecipeCard) -> Result<Vec<u8>, PdfError> {
    let (doc, page, layer) =
        PdfDocument::new(&card.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Card");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfError::Render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PdfError::Render(e.to_string()))?;

    let first_layer = doc.get_page(page).get_layer(layer);
    let mut writer = CardWriter {
        doc: &doc,
        layer: first_layer,
        y: PAGE_HEIGHT - MARGIN,
    };

    writer.paragraph(&card.title, 20.0, &bold);
    writer.gap(2.0);

    let mut facts = Vec::new();
    if let Some(cuisine) = &card.cuisine {
        facts.push(format!("Cuisine: {cuisine}"));
    }
    facts.push(format!("Prep: {} min", card.prep_duration));
    facts.push(format!("Cook: {} min", card.cook_duration));
    if let Some(rating) = card.average_rating {
        facts.push(format!("Rating: {rating:.2} / 5"));
    }
    writer.paragraph(&facts.join("   |   "), 10.0, &regular);

    if !card.description.is_empty() {
        writer.gap(4.0);
        writer.paragraph(&card.description, 11.0, &regular);
    }

    writer.gap(6.0);
    writer.paragraph("Ingredients", 14.0, &bold);
    if card.ingredients.is_empty() {
        writer.paragraph("None listed", 11.0, &regular);
    }
    for ingredient in &card.ingredients {
        writer.paragraph(&format!("- {ingredient}"), 11.0, &regular);
    }

    writer.gap(6.0);
    writer.paragraph("Instructions", 14.0, &bold);
    writer.paragraph(&card.instructions, 11.0, &regular);

    doc.save_to_bytes()
        .map_err(|e| PdfError::Render(e.to_string()))
}

struct CardWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl CardWriter<'_> {
    fn paragraph(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        let line_height = size * PT_TO_MM * 1.4;
        // Helvetica averages about half an em per glyph.
        let max_chars = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * PT_TO_MM * 0.5)) as usize;

        for line in wrap(&winansi(text), max_chars) {
            if self.y - line_height < MARGIN {
                let (page, layer) = self
                    .doc
                    .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Card");
                self.layer = self.doc.get_page(page).get_layer(layer);
                self.y = PAGE_HEIGHT - MARGIN;
            }
            self.y -= line_height;
            self.layer
                .use_text(line, size, Mm(MARGIN), Mm(self.y), font);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Characters Windows-1252 adds in 0x80..=0x9F.
const CP1252_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

fn winansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' | '\r' | '\n' | ' '..='~' | '\u{A0}'..='\u{FF}' => c,
            c if CP1252_EXTRAS.contains(c) => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap. Explicit newlines are kept and words longer than a
/// line are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in source_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let extra = if current_len == 0 { word.len() } else { word.len() + 1 };
            if current_len + extra > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        lines.push(current);
    }

    lines
}
