//! Per-type field extraction

use futures::future::join_all;
use linked_art_types::{
    CanonicalRecord, Details, EntityKind, EntityRef, Event, GroupFields, ObjectFields,
    PersonFields, PlaceFields, Reference, WorkFields,
};

use crate::resolve::normalizer::Scope;

pub(crate) async fn details(scope: &Scope<'_>, record: &CanonicalRecord) -> Option<Details> {
    match record.kind() {
        EntityKind::Person => Some(Details::Person(person(scope, record).await)),
        EntityKind::Group => Some(Details::Group(group(scope, record).await)),
        EntityKind::Place => Some(Details::Place(PlaceFields {
            coordinates: record.defined_by.clone(),
        })),
        EntityKind::HumanMadeObject => Some(Details::Object(object(scope, record).await)),
        EntityKind::LinguisticObject | EntityKind::VisualItem => {
            Some(Details::Work(work(scope, record).await))
        }
        EntityKind::Other => None,
    }
}

fn date(event: Option<&Event>) -> Option<String> {
    event.and_then(Event::begin).map(str::to_string)
}

fn places(event: Option<&Event>) -> &[EntityRef] {
    event.map(|e| e.took_place_at.as_slice()).unwrap_or(&[])
}

fn actors(event: Option<&Event>) -> &[EntityRef] {
    event.map(|e| e.carried_out_by.as_slice()).unwrap_or(&[])
}

/// Actors of an event followed by those of its parts
fn actors_with_parts(event: &Event) -> Vec<EntityRef> {
    event
        .carried_out_by
        .iter()
        .chain(event.part.iter().flat_map(|p| p.carried_out_by.iter()))
        .cloned()
        .collect()
}

async fn person(scope: &Scope<'_>, record: &CanonicalRecord) -> PersonFields {
    let born = record.born.as_ref();
    let died = record.died.as_ref();
    let (birth_place, death_place) = futures::join!(
        scope.resolve_first(places(born)),
        scope.resolve_first(places(died)),
    );
    PersonFields {
        birth_date: date(born),
        birth_place,
        death_date: date(died),
        death_place,
    }
}

async fn group(scope: &Scope<'_>, record: &CanonicalRecord) -> GroupFields {
    let formed = record.formed_by.as_ref();
    let dissolved = record.dissolved_by.as_ref();
    let (founding_place, founder, dissolution_place, dissolver) = futures::join!(
        scope.resolve_first(places(formed)),
        scope.resolve_all(actors(formed)),
        scope.resolve_first(places(dissolved)),
        // only the first dissolving actor is kept
        scope.resolve_first(actors(dissolved)),
    );
    GroupFields {
        founding_date: date(formed),
        founding_place,
        founder,
        dissolution_date: date(dissolved),
        dissolution_place,
        dissolver,
    }
}

/// What one encounter event contributes to the discovery fields
struct Encounter {
    date: Option<String>,
    place: Option<Reference>,
    actors: Vec<Reference>,
}

async fn encounter(scope: &Scope<'_>, event: &Event) -> Encounter {
    let actors = actors_with_parts(event);
    let (place, actors) = futures::join!(
        scope.resolve_first(&event.took_place_at),
        scope.resolve_all(&actors),
    );
    Encounter {
        date: event.begin_or_end().map(str::to_string),
        place,
        actors,
    }
}

async fn object(scope: &Scope<'_>, record: &CanonicalRecord) -> ObjectFields {
    let produced = record.produced_by.as_ref();
    let creators = produced.map(actors_with_parts).unwrap_or_default();

    let (creation_place, creator, encounters, material, carries, shows) = futures::join!(
        scope.resolve_first(places(produced)),
        scope.resolve_all(&creators),
        join_all(record.encountered_by.iter().map(|e| encounter(scope, e))),
        scope.resolve_all(&record.made_of),
        scope.expand_all(&record.carries),
        scope.expand_all(&record.shows),
    );

    let mut fields = ObjectFields {
        creation_date: produced.and_then(Event::begin_or_end).map(str::to_string),
        creation_place,
        creator,
        material,
        carries,
        shows,
        ..ObjectFields::default()
    };

    // Later encounters overwrite dates and places, but a place that failed to
    // resolve leaves the earlier one in place. Discoverers accumulate.
    for encounter in encounters {
        if encounter.date.is_some() {
            fields.discovery_date = encounter.date;
        }
        if encounter.place.is_some() {
            fields.discovery_place = encounter.place;
        }
        fields.discoverer.extend(encounter.actors);
    }
    fields
}

async fn work(scope: &Scope<'_>, record: &CanonicalRecord) -> WorkFields {
    let (about, represents) = futures::join!(
        scope.resolve_all(&record.about),
        scope.resolve_all(&record.represents),
    );
    WorkFields { about, represents }
}
