diesel::table! {
    appointments (id) {
        id -> Int8,
        doctor_id -> Uuid,
        patient_id -> Uuid,
        slot_id -> Int8,
        appointment_time -> Jsonb,
        status -> Varchar,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    doctor_availability (id) {
        id -> Int8,
        doctor_id -> Uuid,
        available_date -> Date,
        start_time -> Time,
        end_time -> Time,
        is_booked -> Bool,
    }
}

diesel::joinable!(appointments -> doctor_availability (slot_id));

diesel::allow_tables_to_appear_in_same_query!(appointments, doctor_availability,);
