//! Bundled demo content.
//!
//! Entries go through the regular constructors; an entry that fails
//! validation is skipped (the tests pin the expected counts).

use crate::model::{
    Course, CourseDraft, CourseId, Lesson, LessonDraft, LessonId, Meditation, MeditationDraft,
    MeditationId,
};

struct MeditationSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    minutes: u32,
    category: &'static str,
    image: &'static str,
    featured: bool,
}

const MEDITATIONS: &[MeditationSeed] = &[
    MeditationSeed {
        id: "1",
        title: "Cosmic Harmony of the Pleiades",
        description: "A deep meditation connecting you with the energy of the Pleiades star cluster.",
        minutes: 15,
        category: "Stellar",
        image: "https://images.unsplash.com/photo-1534447677768-be436bb09401?q=80&w=1000",
        featured: true,
    },
    MeditationSeed {
        id: "2",
        title: "Healing the Inner Child",
        description: "Reconnect with your inner child and soften old wounds.",
        minutes: 20,
        category: "Healing",
        image: "https://images.unsplash.com/photo-1528459801416-a9e53bbf4e17?q=80&w=1000",
        featured: true,
    },
    MeditationSeed {
        id: "3",
        title: "Opening the Third Eye",
        description: "A practice for awakening intuition through the sixth chakra.",
        minutes: 18,
        category: "Chakras",
        image: "https://images.unsplash.com/photo-1506126613408-eca07ce68773?q=80&w=1000",
        featured: false,
    },
    MeditationSeed {
        id: "4",
        title: "Journey to the Stars",
        description: "An astral journey to the Pleiades in search of cosmic wisdom.",
        minutes: 25,
        category: "Stellar",
        image: "https://images.unsplash.com/photo-1419242902214-272b3f66ee7a?q=80&w=1000",
        featured: true,
    },
    MeditationSeed {
        id: "5",
        title: "Aura Cleansing",
        description: "Release stagnant energy and restore a bright, balanced field.",
        minutes: 12,
        category: "Energy",
        image: "https://images.unsplash.com/photo-1500534314209-a25ddb2bd429?q=80&w=1000",
        featured: false,
    },
    MeditationSeed {
        id: "6",
        title: "Starlit Sleep",
        description: "A slow body scan under the night sky to ease into deep sleep.",
        minutes: 30,
        category: "Sleep",
        image: "https://images.unsplash.com/photo-1475274047050-1d0c0975c63e?q=80&w=1000",
        featured: false,
    },
];

struct LessonSeed {
    id: &'static str,
    title: &'static str,
    minutes: u32,
    description: &'static str,
    locked: bool,
}

struct CourseSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    advertised_lessons: u32,
    rating: f32,
    category: &'static str,
    image: &'static str,
    featured: bool,
    lessons: &'static [LessonSeed],
}

const COURSES: &[CourseSeed] = &[
    CourseSeed {
        id: "1",
        title: "Foundations of Spiritual Growth",
        description: "A starter course covering the core ideas of esoteric practice.",
        advertised_lessons: 8,
        rating: 4.8,
        category: "Beginners",
        image: "https://images.unsplash.com/photo-1518050346340-aa2ec3bb424b?q=80&w=1000",
        featured: true,
        lessons: &[
            LessonSeed {
                id: "1-1",
                title: "Introduction",
                minutes: 45,
                description: "An overview of the main concepts and traditions.",
                locked: false,
            },
            LessonSeed {
                id: "1-2",
                title: "A Short History",
                minutes: 50,
                description: "How the traditions developed across cultures.",
                locked: false,
            },
            LessonSeed {
                id: "1-3",
                title: "The Energy Body",
                minutes: 55,
                description: "Subtle bodies, chakras and energy channels.",
                locked: true,
            },
            LessonSeed {
                id: "1-4",
                title: "Meditation Basics",
                minutes: 40,
                description: "Simple techniques to start a daily practice.",
                locked: true,
            },
        ],
    },
    CourseSeed {
        id: "2",
        title: "Astrology for Everyday Life",
        description: "Read a natal chart and use planetary cycles for planning.",
        advertised_lessons: 3,
        rating: 4.6,
        category: "Astrology",
        image: "https://images.unsplash.com/photo-1532968961962-8a0cb3a2d4f5?q=80&w=1000",
        featured: false,
        lessons: &[
            LessonSeed {
                id: "2-1",
                title: "Signs and Houses",
                minutes: 35,
                description: "The twelve signs and twelve houses.",
                locked: false,
            },
            LessonSeed {
                id: "2-2",
                title: "Planets",
                minutes: 40,
                description: "What each planet represents.",
                locked: true,
            },
            LessonSeed {
                id: "2-3",
                title: "Your Natal Chart",
                minutes: 60,
                description: "Putting it together on a real chart.",
                locked: true,
            },
        ],
    },
    CourseSeed {
        id: "3",
        title: "Energy Healing Practice",
        description: "Hands-on methods for sensing and directing healing energy.",
        advertised_lessons: 2,
        rating: 4.9,
        category: "Healing",
        image: "https://images.unsplash.com/photo-1545389336-cf090694435e?q=80&w=1000",
        featured: true,
        lessons: &[
            LessonSeed {
                id: "3-1",
                title: "Sensing Energy",
                minutes: 30,
                description: "Exercises to feel the energy between your palms.",
                locked: false,
            },
            LessonSeed {
                id: "3-2",
                title: "Healing Sessions",
                minutes: 50,
                description: "Structure of a full healing session.",
                locked: true,
            },
        ],
    },
];

fn build_meditation(seed: &MeditationSeed) -> Option<Meditation> {
    let id = MeditationId::new(seed.id).ok()?;
    Meditation::new(
        id,
        MeditationDraft {
            title: seed.title.to_owned(),
            description: seed.description.to_owned(),
            duration_label: format!("{} min", seed.minutes),
            duration_minutes: seed.minutes,
            image_url: seed.image.to_owned(),
            audio_url: format!("https://example.com/meditation{}.mp3", seed.id),
            category: seed.category.to_owned(),
            featured: seed.featured,
        },
    )
    .ok()
}

fn build_lesson(seed: &LessonSeed) -> Option<Lesson> {
    let id = LessonId::new(seed.id).ok()?;
    Lesson::new(
        id,
        LessonDraft {
            title: seed.title.to_owned(),
            duration_label: format!("{} min", seed.minutes),
            description: seed.description.to_owned(),
            video_url: Some(format!("https://example.com/video{}.mp4", seed.id)),
            locked: seed.locked,
        },
    )
    .ok()
}

fn build_course(seed: &CourseSeed) -> Option<Course> {
    let id = CourseId::new(seed.id).ok()?;
    let lessons = seed.lessons.iter().map(build_lesson).collect::<Option<Vec<_>>>()?;
    Course::with_lesson_count(
        id,
        CourseDraft {
            title: seed.title.to_owned(),
            description: seed.description.to_owned(),
            rating: seed.rating,
            image_url: seed.image.to_owned(),
            category: seed.category.to_owned(),
            featured: seed.featured,
            lessons,
        },
        seed.advertised_lessons,
    )
    .ok()
}

pub(super) fn meditations() -> Vec<Meditation> {
    MEDITATIONS.iter().filter_map(build_meditation).collect()
}

pub(super) fn courses() -> Vec<Course> {
    COURSES.iter().filter_map(build_course).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_seed_entry_is_valid() {
        assert_eq!(meditations().len(), MEDITATIONS.len());
        assert_eq!(courses().len(), COURSES.len());
    }

    #[test]
    fn first_course_advertises_more_lessons_than_published() {
        let first = &courses()[0];
        assert_eq!(first.lesson_count(), 8);
        assert_eq!(first.lessons().len(), 4);
    }
}
