use std::io::{self, Write};

use color_eyre::Result;
use color_eyre::eyre::WrapErr;

use crate::ports::catalog::CatalogClient;
use crate::ports::similarity::SimilarityClient;
use crate::services::recommend::manager::RecommendationSet;
use crate::services::recommend::{Candidate, Category, QueryContext, RecommendService};

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush().wrap_err("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .wrap_err("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn optional(answer: String) -> Option<String> {
    if answer.is_empty() { None } else { Some(answer) }
}

/// The full interactive session: musician branch, then find or manage.
pub async fn run<C: CatalogClient, S: SimilarityClient>(
    service: &RecommendService<C, S>,
) -> Result<()> {
    let is_musician = prompt("Are you a musician? (yes/no): ")?.to_lowercase();
    if is_musician == "yes" {
        loop {
            let action =
                prompt("Do you want to find a recommendation or manage your algorithm? (find/manage): ")?
                    .to_lowercase();
            match action.as_str() {
                "find" => return run_find(service).await,
                "manage" => return run_manage(service).await,
                _ => println!("Invalid option."),
            }
        }
    }
    run_find(service).await
}

/// One find flow: gather a confirmed query, recommend, collect feedback.
pub async fn run_find<C: CatalogClient, S: SimilarityClient>(
    service: &RecommendService<C, S>,
) -> Result<()> {
    let ctx = read_query_context()?;
    let recommendations = service.recommend(&ctx).await;

    if recommendations.is_empty() {
        println!("Sorry, {}.", ctx.category.empty_sentinel());
        return Ok(());
    }

    println!("\nRecommendations:");
    print_candidates(&recommendations);
    collect_feedback(&recommendations)?;
    Ok(())
}

/// Manage session: build the full set for the artist, let them edit it, then
/// collect feedback. The set is discarded when the session ends.
pub async fn run_manage<C: CatalogClient, S: SimilarityClient>(
    service: &RecommendService<C, S>,
) -> Result<()> {
    let artist_name = prompt("Enter your artist name: ")?;
    let mut set = service.full_set(&artist_name).await;

    print_set(&set);

    loop {
        let action =
            prompt("\nDo you want to add or remove a recommendation? (add/remove/done): ")?
                .to_lowercase();
        match action.as_str() {
            "done" => break,
            "add" | "remove" => {
                let answer = prompt("Which category do you want to modify? (artists/albums/songs): ")?;
                let category: Category = match answer.parse() {
                    Ok(category) => category,
                    Err(error) => {
                        println!("{}", error);
                        continue;
                    }
                };
                if action == "add" {
                    let name =
                        prompt(&format!("Enter the name of the {} to add: ", category.singular()))?;
                    if let Err(error) = set.add(category, name, None) {
                        println!("{}", error);
                    }
                } else {
                    let name = prompt(&format!(
                        "Enter the name of the {} to remove: ",
                        category.singular()
                    ))?;
                    set.remove(category, &name);
                }
            }
            _ => println!("Invalid action."),
        }
    }

    println!("\nHere are your recommendations:");
    for category in Category::ALL {
        print_candidates(set.list(category));
    }
    for category in Category::ALL {
        collect_feedback(set.list(category))?;
    }
    Ok(())
}

/// Prompt until a valid, confirmed query is entered. Album and song queries
/// require the owning artist and a yes confirmation before any provider call.
fn read_query_context() -> Result<QueryContext> {
    loop {
        let input_type = prompt("Enter type (artist, album, song): ")?;
        let Some(category) = Category::parse_input_type(&input_type) else {
            println!("Invalid type.");
            continue;
        };

        if category == Category::Artists {
            let query = prompt("Enter the artist name: ")?;
            let exclude_artist =
                optional(prompt("Enter an artist to exclude (leave blank for none): ")?);
            return Ok(QueryContext {
                category,
                query,
                artist: None,
                exclude_artist,
            });
        }

        let query = prompt(&format!("Enter {} name: ", category.singular()))?;
        let artist = prompt(&format!(
            "Enter the artist name for the {}: ",
            category.singular()
        ))?;
        let verify = prompt(&format!(
            "You entered '{}' by '{}', is this correct? (yes/no): ",
            query, artist
        ))?
        .to_lowercase();
        if verify != "yes" {
            println!("Let's try again.");
            continue;
        }

        let exclude_artist =
            optional(prompt("Enter an artist to exclude (leave blank for none): ")?);
        return Ok(QueryContext {
            category,
            query,
            artist: Some(artist),
            exclude_artist,
        });
    }
}

fn print_candidates(candidates: &[Candidate]) {
    for candidate in candidates {
        match &candidate.entity.artist {
            Some(artist) => println!(
                "- {} by {} (Link: {})",
                candidate.entity.name, artist, candidate.entity.link
            ),
            None => println!("- {} (Link: {})", candidate.entity.name, candidate.entity.link),
        }
    }
}

fn print_set(set: &RecommendationSet) {
    println!("\nHere are your algorithm's current recommendations:");
    for category in Category::ALL {
        let heading = match category {
            Category::Artists => "Artists",
            Category::Albums => "Albums",
            Category::Songs => "Songs",
        };
        println!("{}:", heading);
        print_candidates(set.list(category));
    }
}

/// Feedback is acknowledged and discarded; nothing is persisted.
fn collect_feedback(candidates: &[Candidate]) -> Result<()> {
    for candidate in candidates {
        let name = &candidate.entity.name;
        let feedback = prompt(&format!("Do you like '{}'? (yes/no/never heard of): ", name))?
            .to_lowercase();
        match feedback.as_str() {
            "yes" => println!("Great! Adding '{}' to your liked list.", name),
            "no" => println!("Okay, removing '{}' from recommendations.", name),
            "never heard of" => println!("Maybe give '{}' a listen to see if you like them.", name),
            _ => println!("Invalid input, skipping '{}'.", name),
        }
    }
    Ok(())
}
