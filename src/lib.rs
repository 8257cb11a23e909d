//! Hero Quiz core crate.
//!
//! The quiz engine (state machine, question provider, countdown, score
//! tracker) lives in `quiz` and is pure Rust, testable natively. The browser
//! presentation layer in `web` is only compiled for wasm32 and is entered
//! from JS via `start_game()`.

use wasm_bindgen::prelude::*;

pub mod quiz;

#[cfg(target_arch = "wasm32")]
mod web;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Pinned fallback character dataset (name, description).
// Substituted whenever the remote pool is unavailable or comes up short.
// -----------------------------------------------------------------------------

pub const FALLBACK_CHARACTERS: &[(&str, &str)] = &[
    ("Spider-Man", "Bitten by a radioactive spider, Peter Parker swings across New York with wall-crawling agility."),
    ("Iron Man", "Genius billionaire Tony Stark fights in a self-built armored suit powered by an arc reactor."),
    ("Captain America", "Super-soldier Steve Rogers carries an unbreakable vibranium shield."),
    ("Thor", "The Asgardian god of thunder, wielder of the hammer Mjolnir."),
    ("Hulk", "Bruce Banner's gamma-fueled alter ego, strongest one there is."),
    ("Black Widow", "Master spy Natasha Romanoff, trained in the Red Room."),
    ("Hawkeye", "Clint Barton never misses with a bow."),
    ("Doctor Strange", "Sorcerer Supreme and guardian of the Sanctum Sanctorum."),
    ("Black Panther", "T'Challa, king of Wakanda, clad in a vibranium suit."),
    ("Captain Marvel", "Carol Danvers channels cosmic energy absorbed from the Kree."),
    ("Scarlet Witch", "Wanda Maximoff bends probability and reality itself."),
    ("Vision", "A synthezoid powered by the Mind Stone."),
    ("Ant-Man", "Scott Lang shrinks to insect size while keeping full strength."),
    ("Wasp", "Hope van Dyne flies and stings at miniature scale."),
    ("Falcon", "Sam Wilson soars on mechanical wings."),
    ("Winter Soldier", "Bucky Barnes, a brainwashed assassin turned ally, with a bionic arm."),
    ("Star-Lord", "Peter Quill, half-human outlaw leading the Guardians of the Galaxy."),
    ("Gamora", "The deadliest woman in the galaxy, adopted daughter of Thanos."),
    ("Rocket Raccoon", "A genetically uplifted raccoon with a taste for big guns."),
    ("Groot", "A sentient tree with a vocabulary of three words."),
    ("Drax", "The Destroyer, literal-minded and vengeance-driven."),
    ("Wolverine", "Logan heals from anything and pops adamantium claws."),
    ("Storm", "Ororo Munroe commands wind, rain and lightning."),
    ("Cyclops", "Scott Summers fires concussive optic blasts held back by ruby quartz."),
    ("Jean Grey", "Telepath and telekinetic, host of the Phoenix Force."),
    ("Beast", "Hank McCoy, blue-furred genius and acrobat."),
    ("Rogue", "Absorbs powers and memories through touch."),
    ("Deadpool", "The merc with a mouth, aware he is in a story."),
    ("Daredevil", "Blind lawyer Matt Murdock senses the city through radar."),
    ("Punisher", "Frank Castle wages a one-man war on crime."),
    ("Ghost Rider", "A spirit of vengeance with a flaming skull."),
    ("Silver Surfer", "Herald of Galactus riding a cosmic board."),
    ("Doctor Doom", "Victor von Doom, armored monarch of Latveria."),
    ("Magneto", "Master of magnetism and mutant revolutionary."),
    ("Loki", "The Asgardian god of mischief, Thor's adoptive brother."),
    ("Thanos", "The Mad Titan obsessed with cosmic balance."),
];

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::start_quiz_mode()
}
