//! Prompt templates
//!
//! Three fixed templates (create website, modify website, create application)
//! sharing one output contract: three fenced blocks labelled html, css and
//! javascript, with nothing else around them.

use std::fmt::Write;

use inference::GenerationConfig;

use crate::classifier::{ApplicationFocus, ApplicationProfile};
use crate::constants::generation;
use crate::images::ImageDescriptor;
use crate::request::{CurrentSite, GenerationRequest};

/// A fully assembled prompt with the sampling parameters to run it with
#[derive(Debug, Clone, PartialEq)]
pub struct PromptDocument {
    pub text: String,
    pub generation: GenerationConfig,
}

impl PromptDocument {
    pub fn token_limit(&self) -> u32 {
        self.generation.max_output_tokens
    }
}

const IMAGE_CSS_RULES: &str = "\
   - Set max-width: 100% and height: auto on all images
   - Add display: block and appropriate margins
   - Limit content images to max-width: 600px
   - Add a photo-credit class with smaller font size (12px) and italic style
";

const SCOPED_JS_RULES: &str = "\
Make sure the code is complete, functional, and properly handles user interactions.
The JavaScript code should be properly scoped and not interfere with the parent window.
";

const CREATE_IMAGE_INTRO: &str =
    "Use the following Unsplash images in your website, matching each image to the most appropriate context:";

const MODIFY_IMAGE_INTRO: &str = "You can use these additional Unsplash images in your modifications, matching each image to the most appropriate context:";

const GAME_INSTRUCTIONS: &str = "\
For this game:
- Include proper game mechanics, scoring, and win/lose conditions
- Add keyboard/mouse controls that are intuitive and responsive
- Include game state management (start, pause, restart, game over)
- Add sound effects if appropriate (with mute option)
";

const SIMULATION_INSTRUCTIONS: &str = "\
For this simulation:
- Create a visually accurate and scientifically correct simulation
- Use appropriate physics formulas and calculations
- Add interactive controls to adjust parameters (speed, gravity, etc.)
- Include animations that accurately represent the physical phenomena
- For solar system or planetary models, use correct relative sizes and orbital mechanics
- Add informational tooltips or labels to explain what's happening
";

const GENERIC_APP_INSTRUCTIONS: &str = "\
For this interactive application:
- Create a clean, intuitive user interface
- Ensure all interactive elements work correctly
- Add appropriate feedback for user actions
- Include error handling for invalid inputs
- Make sure the application state is maintained correctly
";

/// Assemble the prompt for `request`
///
/// `images` is ignored for application requests. An empty slice omits the
/// image reference block entirely.
pub fn build_prompt(request: &GenerationRequest, images: &[ImageDescriptor]) -> PromptDocument {
    match request {
        GenerationRequest::WebsiteCreate { description } => PromptDocument {
            text: website_prompt(description, images),
            generation: sampling(generation::WEBSITE_MAX_TOKENS),
        },
        GenerationRequest::WebsiteModify {
            description,
            current,
        } => PromptDocument {
            text: modification_prompt(description, current, images),
            generation: sampling(generation::WEBSITE_MAX_TOKENS),
        },
        GenerationRequest::ApplicationCreate { description } => {
            let profile = ApplicationProfile::detect(description);
            PromptDocument {
                text: application_prompt(description, profile.focus()),
                generation: sampling(application_token_limit(&profile)),
            }
        }
    }
}

/// Simulations get the largest ceiling even when the game template is used
pub fn application_token_limit(profile: &ApplicationProfile) -> u32 {
    if profile.is_simulation {
        generation::SIMULATION_MAX_TOKENS
    } else {
        generation::APPLICATION_MAX_TOKENS
    }
}

fn sampling(max_output_tokens: u32) -> GenerationConfig {
    GenerationConfig {
        temperature: generation::TEMPERATURE,
        top_p: Some(generation::TOP_P),
        top_k: Some(generation::TOP_K),
        max_output_tokens,
    }
}

/// Numbered list of images, or an empty string when there are none
pub fn image_reference_block(intro: &str, images: &[ImageDescriptor]) -> String {
    if images.is_empty() {
        return String::new();
    }

    let mut block = format!("{}\n", intro);
    for (i, image) in images.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = write!(
            block,
            "Image {} (Topic: {}):\n\
             - Small (recommended): {}\n\
             - Thumbnail: {}\n\
             - Regular: {}\n\
             Description: {}\n\
             Credit: {}\n\n",
            i + 1,
            image.topic,
            image.small_url,
            image.thumb_url,
            image.regular_url,
            image.alt_text,
            image.credit,
        );
    }
    block
}

fn output_format(qualifier: &str) -> String {
    let label = if qualifier.is_empty() {
        String::new()
    } else {
        format!("{} ", qualifier)
    };
    format!(
        "Return only the {q}HTML, CSS, and JavaScript code without any explanations.\n\
         Format the response exactly as:\n\
         ```html\n[{l}HTML code here]\n```\n\
         ```css\n[{l}CSS code here]\n```\n\
         ```javascript\n[{l}JavaScript code here]\n```\n",
        q = label,
        l = capitalize(&label),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn website_prompt(description: &str, images: &[ImageDescriptor]) -> String {
    let mut prompt = format!("Create a website based on this description: {}\n\n", description);

    let block = image_reference_block(CREATE_IMAGE_INTRO, images);
    if !block.is_empty() {
        prompt.push_str(&block);
    }

    prompt.push_str(
        "IMPORTANT INSTRUCTIONS FOR IMAGES:\n\
         1. Instead of using placeholder images or lorem ipsum, use the provided Unsplash images.\n\
         2. Match each image to the most appropriate section of the website based on its topic and description.\n\
         3. Make sure to include the photographer credit in the website footer or directly below/near each image.\n\
         4. Use the images in a way that enhances the website's content and purpose.\n\
         5. ALWAYS include CSS for ALL images to ensure they are responsive and properly sized with these rules:\n",
    );
    prompt.push_str(IMAGE_CSS_RULES);
    prompt.push_str(
        "6. Keep images reasonably sized - use the small or thumbnail versions when appropriate.\n\
         7. If you need additional images beyond what's provided, use descriptive alt text instead of placeholder URLs.\n\n",
    );

    prompt.push_str(&output_format(""));
    prompt.push_str(SCOPED_JS_RULES);
    prompt
}

fn modification_prompt(
    description: &str,
    current: &CurrentSite,
    images: &[ImageDescriptor],
) -> String {
    let mut prompt = format!(
        "Modify this website according to this description: {}\n\n",
        description
    );
    let _ = write!(
        prompt,
        "Current HTML:\n```html\n{}\n```\n\n\
         Current CSS:\n```css\n{}\n```\n\n\
         Current JavaScript:\n```javascript\n{}\n```\n\n",
        current.html, current.css, current.js,
    );

    let block = image_reference_block(MODIFY_IMAGE_INTRO, images);
    if !block.is_empty() {
        prompt.push_str(&block);
    }

    prompt.push_str(
        "IMPORTANT INSTRUCTIONS FOR IMAGES:\n\
         1. Preserve all existing Unsplash image credits and attributions in the current website\n\
         2. If adding new images, use the provided Unsplash images with proper attribution\n\
         3. Match each new image to the most appropriate section based on its topic and description\n\
         4. Include the photographer credit directly below/near each image or in the footer\n\
         5. Only replace existing images if specifically requested in the modification\n\
         6. Use the images in a way that enhances the website's content and purpose\n\
         7. ALWAYS include CSS for ALL images to ensure they are responsive and properly sized with these rules:\n",
    );
    prompt.push_str(IMAGE_CSS_RULES);
    prompt.push_str(
        "8. Keep images reasonably sized - use the small or thumbnail versions when appropriate\n\
         9. If you need additional images beyond what's provided, use descriptive alt text instead of placeholder URLs\n\n",
    );

    prompt.push_str(&output_format("modified"));
    prompt.push_str(SCOPED_JS_RULES);
    prompt
}

fn application_prompt(description: &str, focus: ApplicationFocus) -> String {
    let instructions = match focus {
        ApplicationFocus::Game => GAME_INSTRUCTIONS,
        ApplicationFocus::Simulation => SIMULATION_INSTRUCTIONS,
        ApplicationFocus::Generic => GENERIC_APP_INSTRUCTIONS,
    };

    let mut prompt = format!(
        "Create a standalone, functional {} using HTML, CSS, and JavaScript.\n\n",
        description
    );
    prompt.push_str(
        "IMPORTANT INSTRUCTIONS:\n\
         1. Focus on creating a WORKING, INTERACTIVE application, not just a website about it.\n\
         2. The JavaScript should contain all the application logic and functionality.\n\
         3. Use canvas for graphics if appropriate for the application.\n\
         4. Include clear instructions for the user on how to use the application.\n\
         5. Make sure the code is complete, functional, and properly handles user interactions.\n\
         6. The application should work entirely in the browser without requiring any server-side code.\n\
         7. The JavaScript code should be properly scoped and not interfere with the parent window.\n\
         8. Do not include any placeholder functionality - everything should actually work.\n\
         9. Use requestAnimationFrame for smooth animations where appropriate.\n\
         10. Ensure the application is responsive and works on different screen sizes.\n\n",
    );
    prompt.push_str(instructions);
    prompt.push('\n');
    prompt.push_str(&output_format(""));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(topic: &str, id: &str) -> ImageDescriptor {
        ImageDescriptor {
            small_url: format!("https://img/{}/small", id),
            regular_url: format!("https://img/{}/regular", id),
            thumb_url: format!("https://img/{}/thumb", id),
            alt_text: format!("{} photo", topic),
            credit: format!("Photo by {} on Unsplash", id),
            download_url: format!("https://img/{}/download", id),
            topic: topic.to_string(),
        }
    }

    fn assert_output_contract(text: &str) {
        assert!(text.contains("```html"));
        assert!(text.contains("```css"));
        assert!(text.contains("```javascript"));
        assert!(text.contains("without any explanations"));
    }

    #[test]
    fn test_website_prompt_lists_images() {
        let request = GenerationRequest::website("Create a business website");
        let images = vec![image("office", "a"), image("team", "b")];
        let prompt = build_prompt(&request, &images);

        assert!(prompt.text.contains("business"));
        assert!(prompt.text.contains(CREATE_IMAGE_INTRO));
        assert!(prompt.text.contains("Image 1 (Topic: office):"));
        assert!(prompt.text.contains("Image 2 (Topic: team):"));
        assert!(prompt.text.contains("- Small (recommended): https://img/a/small"));
        assert!(prompt.text.contains("Credit: Photo by b on Unsplash"));
        assert!(prompt.text.contains("max-width: 600px"));
        assert!(prompt.text.contains("(12px) and italic"));
        assert_output_contract(&prompt.text);
        assert_eq!(prompt.token_limit(), 2048);
        assert_eq!(prompt.generation.temperature, 0.7);
        assert_eq!(prompt.generation.top_p, Some(0.8));
        assert_eq!(prompt.generation.top_k, Some(40));
    }

    #[test]
    fn test_no_images_omits_block() {
        let prompt = build_prompt(&GenerationRequest::website("a bakery"), &[]);
        assert!(!prompt.text.contains("Image 1"));
        assert!(!prompt.text.contains(CREATE_IMAGE_INTRO));
        assert!(prompt.text.contains("IMPORTANT INSTRUCTIONS FOR IMAGES"));
    }

    #[test]
    fn test_modification_embeds_code_verbatim() {
        let html = "<div id=\"app\">\n  <p>Hi {name} `x`</p>\n</div>";
        let css = "p { color: red; }\n/* {} */";
        let js = "const f = () => { return `${1}`; };";
        let request =
            GenerationRequest::modification("add a footer", html, css, Some(js.to_string()));
        let prompt = build_prompt(&request, &[image("footer", "f")]);

        assert!(prompt.text.contains(html));
        assert!(prompt.text.contains(css));
        assert!(prompt.text.contains(js));
        assert!(prompt.text.contains(MODIFY_IMAGE_INTRO));
        assert!(prompt.text.contains("Preserve all existing Unsplash image credits"));
        assert!(prompt.text.contains("Only replace existing images if specifically requested"));
        assert!(prompt.text.contains("[Modified HTML code here]"));
        assert_eq!(prompt.token_limit(), 2048);
    }

    #[test]
    fn test_simulation_prompt() {
        let request = GenerationRequest::application("Build a solar system simulation");
        let prompt = build_prompt(&request, &[image("ignored", "z")]);

        assert!(prompt.text.contains("scientifically correct"));
        assert!(prompt.text.contains("physics formulas"));
        assert!(!prompt.text.contains("Image 1"));
        assert!(!prompt.text.contains("IMPORTANT INSTRUCTIONS FOR IMAGES"));
        assert_output_contract(&prompt.text);
        assert_eq!(prompt.token_limit(), 6144);
    }

    #[test]
    fn test_game_block_wins_but_simulation_ceiling_applies() {
        let prompt = build_prompt(&GenerationRequest::application("a physics game"), &[]);
        assert!(prompt.text.contains("For this game:"));
        assert!(!prompt.text.contains("For this simulation:"));
        assert_eq!(prompt.token_limit(), 6144);

        let snake = build_prompt(&GenerationRequest::application("a snake game"), &[]);
        assert_eq!(snake.token_limit(), 4096);
    }

    #[test]
    fn test_generic_application_prompt() {
        let prompt = build_prompt(&GenerationRequest::application("a pomodoro timer"), &[]);
        assert!(prompt.text.contains("For this interactive application:"));
        assert!(prompt.text.contains("requestAnimationFrame"));
        assert_eq!(prompt.token_limit(), 4096);
    }
}
